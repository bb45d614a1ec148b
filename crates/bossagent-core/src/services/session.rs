//! Client session
//! Single owner of the client view. Runs the poll loop and the user actions,
//! and publishes the view to the UI after every change.
//!
//! Network calls run in spawned tasks and hand their results back over a
//! channel, so a slow chat never holds up polling while the view itself is
//! only ever touched by the session task.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::error::{HostError, HostResult};
use crate::models::{DocumentList, HistoryItem, RuntimeConfig, SchedulerSnapshot};
use crate::services::api::BackendClient;
use crate::services::poll::{fetch_tick, TickOutcome, POLL_INTERVAL};
use crate::view::{ClientView, Status};

const ACTION_BUFFER: usize = 32;

/// Receives the view after every change. Implemented by the UI shell.
pub trait ViewSink: Send + Sync + 'static {
    fn publish(&self, view: &ClientView);
}

type Reply<T> = oneshot::Sender<HostResult<T>>;
type Done = mpsc::UnboundedSender<Completion>;

enum Action {
    SendMessage { message: String, reply: Reply<()> },
    Nudge { reply: Reply<()> },
    SaveConfig { config: RuntimeConfig, reply: Reply<()> },
    ClearHistory { reply: Reply<()> },
    ApplyDirectory { path: String, reply: oneshot::Sender<bool> },
    Snapshot { reply: oneshot::Sender<ClientView> },
}

struct InitialState {
    config: RuntimeConfig,
    history: Vec<HistoryItem>,
    documents: DocumentList,
    scheduler: HostResult<SchedulerSnapshot>,
}

struct SavedConfig {
    config: RuntimeConfig,
    documents: DocumentList,
    scheduler: HostResult<SchedulerSnapshot>,
}

struct ClearedHistory {
    history: Vec<HistoryItem>,
    scheduler: HostResult<SchedulerSnapshot>,
}

enum Completion {
    Loaded(HostResult<InitialState>),
    Tick(TickOutcome),
    Chat {
        result: HostResult<String>,
        reply: Reply<()>,
    },
    ConfigSaved {
        result: HostResult<SavedConfig>,
        reply: Reply<()>,
    },
    HistoryCleared {
        result: HostResult<ClearedHistory>,
        reply: Reply<()>,
    },
}

impl Completion {
    /// Whether this completion frees the loop to schedule the next tick.
    fn ends_poll_cycle(&self) -> bool {
        matches!(self, Completion::Loaded(_) | Completion::Tick(_))
    }
}

pub struct ClientSession {
    client: BackendClient,
    view: ClientView,
    sink: Arc<dyn ViewSink>,
    interval: Duration,
}

impl ClientSession {
    pub fn new(client: BackendClient, sink: Arc<dyn ViewSink>) -> Self {
        Self {
            client,
            view: ClientView::default(),
            sink,
            interval: POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Start the session task on the current runtime.
    pub fn spawn(self) -> SessionHandle {
        let (actions, rx) = mpsc::channel(ACTION_BUFFER);
        tokio::spawn(self.run(rx));
        SessionHandle { actions }
    }

    async fn run(mut self, mut actions: mpsc::Receiver<Action>) {
        log::info!("[Session] Client session started for {}", self.client.base_url());
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();

        self.publish();
        self.spawn_work(&done_tx, |client| async move {
            Completion::Loaded(load_initial(&client).await)
        });

        let next_tick = tokio::time::sleep(self.interval);
        tokio::pin!(next_tick);
        // Set while the initial load or a tick is in flight
        let mut polling = true;

        loop {
            tokio::select! {
                () = &mut next_tick, if !polling => {
                    polling = true;
                    self.spawn_work(&done_tx, |client| async move {
                        Completion::Tick(fetch_tick(&client).await)
                    });
                }
                Some(done) = done_rx.recv() => {
                    if done.ends_poll_cycle() {
                        polling = false;
                        next_tick.as_mut().reset(Instant::now() + self.interval);
                    }
                    self.complete(done);
                }
                action = actions.recv() => match action {
                    Some(action) => self.dispatch(action, &done_tx),
                    None => break,
                },
            }
        }

        log::info!("[Session] Client session stopped");
    }

    fn dispatch(&mut self, action: Action, done: &Done) {
        match action {
            Action::SendMessage { message, reply } => {
                if message.trim().is_empty() {
                    let _ = reply.send(Ok(()));
                    return;
                }
                self.view.push_user(message.clone());
                self.view.status = Status::Thinking;
                self.publish();
                self.spawn_work(done, move |client| async move {
                    let result = client.chat(&message).await;
                    Completion::Chat { result, reply }
                });
            }
            Action::Nudge { reply } => {
                self.view.status = Status::Thinking;
                self.publish();
                self.spawn_work(done, move |client| async move {
                    let result = client.chat("").await;
                    Completion::Chat { result, reply }
                });
            }
            Action::SaveConfig { config, reply } => {
                self.view.status = Status::SavingConfig;
                self.publish();
                let config = config.trimmed();
                self.spawn_work(done, move |client| async move {
                    let result = save_and_reload(&client, &config).await;
                    Completion::ConfigSaved { result, reply }
                });
            }
            Action::ClearHistory { reply } => {
                self.spawn_work(done, move |client| async move {
                    let result = clear_and_reload(&client).await;
                    Completion::HistoryCleared { result, reply }
                });
            }
            Action::ApplyDirectory { path, reply } => {
                let changed = self.view.apply_directory(&path);
                if changed {
                    self.publish();
                }
                let _ = reply.send(changed);
            }
            Action::Snapshot { reply } => {
                let _ = reply.send(self.view.clone());
            }
        }
    }

    fn complete(&mut self, done: Completion) {
        match done {
            Completion::Loaded(Ok(initial)) => {
                let scheduler_read = initial.scheduler.is_ok();
                self.view.replace_config(initial.config);
                self.view.replace_history(initial.history);
                self.view.apply_documents(initial.documents);
                self.view.apply_scheduler(initial.scheduler);
                // An action started during the load owns the status line
                if matches!(self.view.status, Status::Connecting | Status::Disconnected) {
                    self.view.status = if scheduler_read {
                        Status::Connected
                    } else {
                        Status::Disconnected
                    };
                }
            }
            Completion::Loaded(Err(e)) => {
                log::warn!("[Session] Initial load failed: {}", e);
                self.view.status = Status::Disconnected;
            }
            Completion::Tick(outcome) => self.view.apply_tick(outcome),
            Completion::Chat { result, reply } => match result {
                Ok(response) => {
                    self.view.push_assistant(response);
                    self.view.status = Status::Connected;
                    let _ = reply.send(Ok(()));
                }
                Err(e) => self.fail("chat", e, reply),
            },
            Completion::ConfigSaved { result, reply } => match result {
                Ok(saved) => {
                    self.view.replace_config(saved.config);
                    self.view.apply_documents(saved.documents);
                    self.view.apply_scheduler(saved.scheduler);
                    self.view.status = Status::ConfigSaved;
                    let _ = reply.send(Ok(()));
                }
                Err(e) => self.fail("save config", e, reply),
            },
            Completion::HistoryCleared { result, reply } => match result {
                Ok(cleared) => {
                    self.view.replace_history(cleared.history);
                    self.view.apply_scheduler(cleared.scheduler);
                    self.view.status = Status::HistoryCleared;
                    let _ = reply.send(Ok(()));
                }
                Err(e) => self.fail("clear history", e, reply),
            },
        }
        self.publish();
    }

    fn fail(&mut self, action: &str, error: HostError, reply: Reply<()>) {
        log::warn!("[Session] {} failed: {}", action, error);
        self.view.status = Status::Failed(error.to_string());
        let _ = reply.send(Err(error));
    }

    fn spawn_work<F, Fut>(&self, done: &Done, work: F)
    where
        F: FnOnce(BackendClient) -> Fut,
        Fut: Future<Output = Completion> + Send + 'static,
    {
        let task = work(self.client.clone());
        let done = done.clone();
        tokio::spawn(async move {
            let _ = done.send(task.await);
        });
    }

    fn publish(&self) {
        self.sink.publish(&self.view);
    }
}

async fn load_initial(client: &BackendClient) -> HostResult<InitialState> {
    let config = client.config().await?;
    let history = client.history().await?;
    let documents = client.documents().await?;
    let scheduler = client.scheduler().await;
    Ok(InitialState {
        config,
        history,
        documents,
        scheduler,
    })
}

async fn save_and_reload(client: &BackendClient, config: &RuntimeConfig) -> HostResult<SavedConfig> {
    let config = client.save_config(config).await?;
    let documents = client.documents().await?;
    let scheduler = client.scheduler().await;
    Ok(SavedConfig {
        config,
        documents,
        scheduler,
    })
}

async fn clear_and_reload(client: &BackendClient) -> HostResult<ClearedHistory> {
    client.clear_history().await?;
    let history = client.history().await?;
    let scheduler = client.scheduler().await;
    Ok(ClearedHistory { history, scheduler })
}

/// Cloneable handle the UI shell uses to drive the session.
#[derive(Clone)]
pub struct SessionHandle {
    actions: mpsc::Sender<Action>,
}

impl SessionHandle {
    pub async fn send_message(&self, message: impl Into<String>) -> HostResult<()> {
        let message = message.into();
        self.ask(|reply| Action::SendMessage { message, reply }).await?
    }

    /// Ask the backend for a proactive follow-up.
    pub async fn nudge(&self) -> HostResult<()> {
        self.ask(|reply| Action::Nudge { reply }).await?
    }

    pub async fn save_config(&self, config: RuntimeConfig) -> HostResult<()> {
        self.ask(|reply| Action::SaveConfig { config, reply }).await?
    }

    pub async fn clear_history(&self) -> HostResult<()> {
        self.ask(|reply| Action::ClearHistory { reply }).await?
    }

    /// Apply the result of a directory selection. Returns whether the form changed.
    pub async fn apply_directory(&self, path: impl Into<String>) -> HostResult<bool> {
        let path = path.into();
        self.ask(|reply| Action::ApplyDirectory { path, reply }).await
    }

    pub async fn snapshot(&self) -> HostResult<ClientView> {
        self.ask(|reply| Action::Snapshot { reply }).await
    }

    async fn ask<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Action) -> HostResult<T> {
        let (reply, response) = oneshot::channel();
        self.actions
            .send(build(reply))
            .await
            .map_err(|_| HostError::SessionClosed)?;
        response.await.map_err(|_| HostError::SessionClosed)
    }
}

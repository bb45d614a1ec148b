//! Client view model
//! Everything the webview renders. Only the client session mutates it.

use serde::Serialize;

use crate::error::HostResult;
use crate::models::{DocumentList, EventBatch, HistoryItem, RuntimeConfig, SchedulerSnapshot};
use crate::services::poll::TickOutcome;
use crate::timer::{self, TimerDisplay};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub text: String,
}

/// Status line shown in the header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum Status {
    #[default]
    Connecting,
    Connected,
    Thinking,
    SavingConfig,
    ConfigSaved,
    HistoryCleared,
    Disconnected,
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientView {
    pub status: Status,
    pub transcript: Vec<TranscriptEntry>,
    pub timer: TimerDisplay,
    pub documents: Vec<String>,
    pub config: RuntimeConfig,
    /// Bumped whenever the host rewrites `config`, so the UI knows when to
    /// overwrite its form inputs.
    pub config_revision: u64,
    /// Bumped when a picked directory lands in `config.documents_dir`. Only
    /// the directory input follows it; other unsaved edits stay put.
    pub directory_revision: u64,
}

impl ClientView {
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.transcript.push(TranscriptEntry {
            role: Role::User,
            text: text.into(),
        });
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.transcript.push(TranscriptEntry {
            role: Role::Assistant,
            text: text.into(),
        });
    }

    /// Replace the transcript with the backend's history.
    pub fn replace_history(&mut self, items: Vec<HistoryItem>) {
        self.transcript.clear();
        for item in items {
            self.push_user(item.user_input);
            self.push_assistant(item.response);
        }
    }

    /// Append each event as an assistant entry, in the order received.
    pub fn apply_events(&mut self, batch: EventBatch) {
        for event in batch.items {
            self.push_assistant(event.message);
        }
    }

    pub fn apply_scheduler(&mut self, snapshot: HostResult<SchedulerSnapshot>) {
        self.timer = match snapshot {
            Ok(snapshot) => timer::project(&snapshot),
            Err(_) => TimerDisplay::disconnected(),
        };
    }

    pub fn apply_documents(&mut self, documents: DocumentList) {
        self.documents = documents.files;
    }

    pub fn replace_config(&mut self, config: RuntimeConfig) {
        self.config = config;
        self.config_revision += 1;
    }

    /// Apply a directory chosen through the bridge. An empty path means the
    /// picker was cancelled and leaves the form untouched.
    pub fn apply_directory(&mut self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }
        self.config.documents_dir = path.to_string();
        self.directory_revision += 1;
        true
    }

    /// Fold one poll tick into the view.
    pub fn apply_tick(&mut self, outcome: TickOutcome) {
        let mut healthy = true;

        match outcome.events {
            Ok(batch) => self.apply_events(batch),
            Err(_) => healthy = false,
        }
        if outcome.scheduler.is_err() {
            healthy = false;
        }
        self.apply_scheduler(outcome.scheduler);

        if !healthy {
            self.status = Status::Disconnected;
        } else if self.status == Status::Disconnected {
            self.status = Status::Connected;
        }
    }
}

//! Backend HTTP client
//! Plain request/response calls against the backend's base URL

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::config::Timeouts;
use crate::error::{HostError, HostResult};
use crate::models::{
    ChatReply, ChatRequest, DocumentList, EventBatch, HistoryItem, HistoryPage, RuntimeConfig,
    SchedulerSnapshot,
};

#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    timeouts: Timeouts,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeouts: Timeouts) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            timeouts,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn history(&self) -> HostResult<Vec<HistoryItem>> {
        let page: HistoryPage = self.get("/history", self.timeouts.request()).await?;
        Ok(page.items)
    }

    pub async fn config(&self) -> HostResult<RuntimeConfig> {
        self.get("/config", self.timeouts.request()).await
    }

    /// Persist the runtime config; the backend answers with the applied values.
    pub async fn save_config(&self, config: &RuntimeConfig) -> HostResult<RuntimeConfig> {
        self.post("/config", Some(config), self.timeouts.request()).await
    }

    pub async fn documents(&self) -> HostResult<DocumentList> {
        self.get("/documents", self.timeouts.request()).await
    }

    pub async fn scheduler(&self) -> HostResult<SchedulerSnapshot> {
        self.get("/scheduler", self.timeouts.events()).await
    }

    /// Drain the backend's inbox. Each event is delivered once.
    pub async fn events(&self) -> HostResult<EventBatch> {
        self.get("/events", self.timeouts.events()).await
    }

    /// Send a chat message. An empty message asks for a proactive follow-up.
    pub async fn chat(&self, message: &str) -> HostResult<String> {
        let reply: ChatReply = self
            .post("/chat", Some(&ChatRequest { message }), self.timeouts.stream())
            .await?;
        Ok(reply.response.unwrap_or_default())
    }

    pub async fn clear_history(&self) -> HostResult<()> {
        let _ack: serde_json::Value = self
            .post::<(), _>("/history/clear", None, self.timeouts.request())
            .await?;
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, timeout: Duration) -> HostResult<T> {
        let request = self.http.get(self.url(path)).timeout(timeout);
        self.execute(path, request).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&B>,
        timeout: Duration,
    ) -> HostResult<T> {
        let mut request = self.http.post(self.url(path)).timeout(timeout);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(path, request).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> HostResult<T> {
        let transport = |source| HostError::Transport {
            path: path.to_string(),
            source,
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(HostError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        response.json::<T>().await.map_err(transport)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

//! Models module
//! Wire types exchanged with the backend HTTP API
//! Every response type tolerates missing fields so a partial payload still renders

use serde::{Deserialize, Serialize};

/// Result of a single liveness probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub reachable: bool,
    pub http_status: Option<u16>,
}

impl HealthStatus {
    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            http_status: None,
        }
    }

    pub fn responded(status: u16) -> Self {
        Self {
            reachable: true,
            http_status: Some(status),
        }
    }

    /// Only a plain 200 counts as live.
    pub fn is_live(&self) -> bool {
        self.http_status == Some(200)
    }
}

/// Server-reported countdown state (`GET /scheduler`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulerSnapshot {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub remaining_seconds: Option<f64>,
    #[serde(default)]
    pub interval_minutes: Option<f64>,
    #[serde(default)]
    pub deadline: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventItem {
    #[serde(default)]
    pub message: String,
}

/// Inbox events drained by one `GET /events`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBatch {
    #[serde(default)]
    pub items: Vec<EventItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    #[serde(default)]
    pub user_input: String,
    #[serde(default)]
    pub response: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPage {
    #[serde(default)]
    pub items: Vec<HistoryItem>,
}

/// Backend runtime configuration, also used as the settings form state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub llm_model: String,
    #[serde(default)]
    pub openai_base_url: String,
    #[serde(default)]
    pub openai_api_key: String,
    #[serde(default)]
    pub documents_dir: String,
}

impl RuntimeConfig {
    pub fn trimmed(&self) -> Self {
        Self {
            llm_model: self.llm_model.trim().to_string(),
            openai_base_url: self.openai_base_url.trim().to_string(),
            openai_api_key: self.openai_api_key.trim().to_string(),
            documents_dir: self.documents_dir.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentList {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub documents_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: Option<String>,
}

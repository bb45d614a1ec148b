//! Poll tick
//! One reconciliation read: backend events first, then scheduler state

use std::time::Duration;

use crate::error::HostResult;
use crate::models::{EventBatch, SchedulerSnapshot};
use crate::services::api::BackendClient;

/// Fixed cadence between the end of one tick and the start of the next
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Both reads of one tick. Each may fail on its own.
#[derive(Debug)]
pub struct TickOutcome {
    pub events: HostResult<EventBatch>,
    pub scheduler: HostResult<SchedulerSnapshot>,
}

/// Run one tick. The scheduler read is issued only after the events read
/// has resolved, so a scheduler cleared alongside new events is never
/// rendered ahead of them.
pub async fn fetch_tick(client: &BackendClient) -> TickOutcome {
    let events = client.events().await;
    if let Err(e) = &events {
        log::warn!("[Poll] Events read failed: {}", e);
    }

    let scheduler = client.scheduler().await;
    if let Err(e) = &scheduler {
        log::warn!("[Poll] Scheduler read failed: {}", e);
    }

    TickOutcome { events, scheduler }
}

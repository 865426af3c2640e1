use chrono::{DateTime, Utc};

use crate::logs::types::LogResponse;

/// Result of comparing a fetched log list with the last one the user saw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewLogs {
    pub count: usize,
    /// Newest `created_at` in the list; store it as the next `last_seen`
    pub latest: Option<DateTime<Utc>>,
}

/// Counts logs created strictly after `last_seen`.
/// With no `last_seen` the list only sets the baseline, so the count is zero.
pub fn new_logs_since(logs: &[LogResponse], last_seen: Option<DateTime<Utc>>) -> NewLogs {
    let latest = logs.iter().map(|log| log.created_at).max();
    let count = match last_seen {
        Some(seen) => logs.iter().filter(|log| log.created_at > seen).count(),
        None => 0,
    };

    NewLogs {
        count,
        latest: latest.max(last_seen),
    }
}

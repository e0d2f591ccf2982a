//! # Session State Tracker
//!
//! Connection status of the collaboration link, held in a
//! `tokio::sync::watch` cell: every provider event overwrites the value
//! in arrival order, watchers only ever see the latest one.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Synced,
}

impl ConnectionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Synced => "synced",
        }
    }

    /// Whether remote parties can currently see local edits
    pub fn is_online(self) -> bool {
        matches!(self, ConnectionStatus::Connected | ConnectionStatus::Synced)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct StatusTracker {
    cell: watch::Sender<ConnectionStatus>,
}

impl StatusTracker {
    /// `connecting` when a provider is attached, `disconnected` otherwise
    pub fn new(has_provider: bool) -> Self {
        let initial = if has_provider {
            ConnectionStatus::Connecting
        } else {
            ConnectionStatus::Disconnected
        };
        let (cell, _) = watch::channel(initial);
        Self { cell }
    }

    /// Overwrite the status, returning the previous value
    pub fn record(&self, status: ConnectionStatus) -> ConnectionStatus {
        let previous = self.cell.send_replace(status);
        if previous != status {
            debug!(from = %previous, to = %status, "Connection status changed");
        }
        previous
    }

    pub fn current(&self) -> ConnectionStatus {
        *self.cell.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.cell.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_status() {
        assert_eq!(
            StatusTracker::new(true).current(),
            ConnectionStatus::Connecting
        );
        assert_eq!(
            StatusTracker::new(false).current(),
            ConnectionStatus::Disconnected
        );
    }

    #[test]
    fn test_last_event_wins() {
        let tracker = StatusTracker::new(true);

        for status in [
            ConnectionStatus::Connecting,
            ConnectionStatus::Connected,
            ConnectionStatus::Disconnected,
        ] {
            tracker.record(status);
        }

        assert_eq!(tracker.current(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_record_returns_previous() {
        let tracker = StatusTracker::new(true);
        assert_eq!(
            tracker.record(ConnectionStatus::Connected),
            ConnectionStatus::Connecting
        );
    }

    #[tokio::test]
    async fn test_watchers_see_latest_value() {
        let tracker = StatusTracker::new(true);
        let mut watcher = tracker.subscribe();

        tracker.record(ConnectionStatus::Connected);
        tracker.record(ConnectionStatus::Synced);

        watcher.changed().await.unwrap();
        assert_eq!(*watcher.borrow_and_update(), ConnectionStatus::Synced);
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(
            serde_json::to_string(&ConnectionStatus::Synced).unwrap(),
            "\"synced\""
        );
        assert!(ConnectionStatus::Connected.is_online());
        assert!(!ConnectionStatus::Connecting.is_online());
    }
}

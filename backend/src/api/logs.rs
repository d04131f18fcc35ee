//! Progress log streaming via Server-Sent Events (SSE).
//!
//! Long-running operations (imports, exports, plan changes) publish leveled
//! progress entries to a process-wide broadcast channel. Entries are echoed
//! to stdout and fanned out to every connected SSE client.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Severity of a progress entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    fn prefix(self) -> &'static str {
        match self {
            LogLevel::Info => " ",
            LogLevel::Success => "✓",
            LogLevel::Warning => "!",
            LogLevel::Error => "✗",
        }
    }
}

/// A single progress entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Severity.
    pub level: LogLevel,
    /// Human-readable message.
    pub message: String,
    /// When the entry was published.
    pub at: DateTime<Utc>,
}

/// Process-wide progress log.
pub static PROGRESS: Lazy<ProgressLog> = Lazy::new(ProgressLog::new);

/// Broadcasts progress entries to all connected SSE clients.
pub struct ProgressLog {
    sender: broadcast::Sender<LogEntry>,
}

impl ProgressLog {
    fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Publish an entry: echo to stdout, broadcast to subscribers.
    pub fn publish(&self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry {
            level,
            message: message.into(),
            at: Utc::now(),
        };

        println!("   {} {}", entry.level.prefix(), entry.message);

        // Send errors only mean no subscribers are connected.
        let _ = self.sender.send(entry);
    }

    /// Receiver for SSE streaming.
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

/// Publish an informational entry.
pub fn log_info(message: impl Into<String>) {
    PROGRESS.publish(LogLevel::Info, message);
}

/// Publish a success entry.
pub fn log_success(message: impl Into<String>) {
    PROGRESS.publish(LogLevel::Success, message);
}

/// Publish a warning entry.
pub fn log_warning(message: impl Into<String>) {
    PROGRESS.publish(LogLevel::Warning, message);
}

/// Publish an error entry.
pub fn log_error(message: impl Into<String>) {
    PROGRESS.publish(LogLevel::Error, message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let mut rx = PROGRESS.subscribe();
        PROGRESS.publish(LogLevel::Success, "imported 3 rows");

        // Other tests publish to the same process-wide channel; skip past
        // their entries.
        let entry = loop {
            let entry = rx.recv().await.unwrap();
            if entry.message == "imported 3 rows" {
                break entry;
            }
        };
        assert_eq!(entry.level, LogLevel::Success);
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let entry = LogEntry {
            level: LogLevel::Warning,
            message: "skipped 2 rows".into(),
            at: Utc::now(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"level\":\"warning\""));
        assert!(json.contains("\"message\""));
    }
}

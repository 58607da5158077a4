//! In-memory transaction log for tests/dev and for hosts that render history.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::sink::{LogKind, LogSink};

/// One recorded line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub recorded_at: DateTime<Utc>,
    pub kind: LogKind,
    pub line: String,
}

/// Append-only, in-memory sink.
///
/// - No IO
/// - Records keep insertion order
/// - Readers get copies; the stored history cannot be edited from outside
#[derive(Debug, Default)]
pub struct TransactionLog {
    records: Mutex<Vec<LogRecord>>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record so far.
    pub fn records(&self) -> Vec<LogRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Just the lines, in order.
    pub fn lines(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.line).collect()
    }

    /// Lines of one kind, in order.
    pub fn lines_of(&self, kind: LogKind) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.line)
            .collect()
    }

    pub fn len(&self) -> usize {
        match self.records.lock() {
            Ok(records) => records.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `"[<rfc3339>] (<KIND>) -> <line>"` per record, newline-joined.
    pub fn export_as_text(&self) -> String {
        self.records()
            .iter()
            .map(|r| format!("[{}] ({}) -> {}", r.recorded_at.to_rfc3339(), r.kind, r.line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl LogSink for TransactionLog {
    fn record_as(&self, kind: LogKind, line: &str) {
        let record = LogRecord {
            recorded_at: Utc::now(),
            kind,
            line: line.to_string(),
        };

        // Poisoning leaves the vector intact.
        match self.records.lock() {
            Ok(mut records) => records.push(record),
            Err(poisoned) => {
                tracing::warn!("transaction log lock poisoned; recovering");
                poisoned.into_inner().push(record);
            }
        }
    }
}

//! Reporters are handed to every component instead of relying on a global
//! logger. `Important` records are terminal transfer outcomes and validation
//! failures; everything else is `Routine`.

use std::sync::Mutex;

use crate::logging::IMPORTANT_TARGET;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Important,
    Routine,
}

pub trait Reporter: Send + Sync {
    fn record(&self, level: Level, message: &str);

    /// Fatal configuration diagnostics. Always important.
    fn critical(&self, message: &str) {
        self.record(Level::Important, message);
    }

    fn important(&self, message: &str) {
        self.record(Level::Important, message);
    }

    fn routine(&self, message: &str) {
        self.record(Level::Routine, message);
    }
}

/// Renders records through `tracing`. Important records go to the
/// `important` target so the results file layer can pick them out.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn record(&self, level: Level, message: &str) {
        match level {
            Level::Important => tracing::info!(target: IMPORTANT_TARGET, "Important: {}", message),
            Level::Routine => tracing::info!("{}", message),
        }
    }

    fn critical(&self, message: &str) {
        tracing::error!(target: IMPORTANT_TARGET, "Important: {}", message);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub level: Level,
    pub message: String,
}

/// Keeps every record in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    records: Mutex<Vec<Record>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn important_messages(&self) -> Vec<String> {
        self.messages(Level::Important)
    }

    pub fn routine_messages(&self) -> Vec<String> {
        self.messages(Level::Routine)
    }

    fn messages(&self, level: Level) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|r| r.level == level)
            .map(|r| r.message)
            .collect()
    }
}

impl Reporter for MemoryReporter {
    fn record(&self, level: Level, message: &str) {
        if let Ok(mut records) = self.records.lock() {
            records.push(Record {
                level,
                message: message.to_string(),
            });
        }
    }
}

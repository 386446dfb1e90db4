//! In-app activity log, shown by [`crate::ActivityLogPanel`].

use dioxus::prelude::*;

/// Oldest entries are dropped past this many.
const MAX_ENTRIES: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// The part of the app an entry came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogSource {
    /// Startup and seeding.
    App,
    Stories,
    Feed,
}

impl LogSource {
    pub fn label(self) -> &'static str {
        match self {
            LogSource::App => "app",
            LogSource::Stories => "stories",
            LogSource::Feed => "feed",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    pub source: LogSource,
    pub message: String,
}

#[derive(Clone, Debug, Default)]
pub struct ActivityLog {
    pub entries: Vec<LogEntry>,
    pub visible: bool,
}

impl ActivityLog {
    pub fn push(&mut self, entry: LogEntry) {
        if self.entries.len() >= MAX_ENTRIES {
            let excess = self.entries.len() + 1 - MAX_ENTRIES;
            self.entries.drain(..excess);
        }
        self.entries.push(entry);
    }

    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|e| e.level == LogLevel::Error).count()
    }

    pub fn from_source(&self, source: LogSource) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.source == source)
    }
}

pub fn use_activity_log() -> Signal<ActivityLog> {
    use_context::<Signal<ActivityLog>>()
}

/// Append an entry and mirror it to `tracing`.
pub fn log_activity(log: &mut Signal<ActivityLog>, source: LogSource, level: LogLevel, message: &str) {
    match level {
        LogLevel::Error => tracing::error!(source = source.label(), "{message}"),
        LogLevel::Warning => tracing::warn!(source = source.label(), "{message}"),
        LogLevel::Info | LogLevel::Success => tracing::info!(source = source.label(), "{message}"),
    }
    log.write().push(LogEntry {
        timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
        level,
        source,
        message: message.to_string(),
    });
}

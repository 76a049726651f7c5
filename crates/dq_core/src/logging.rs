use std::collections::VecDeque;
use std::sync::Once;
use tracing::Level;

static INIT: Once = Once::new();

/// Logging handle handed to each component; prefixes identify the caller.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    prefixes: VecDeque<String>,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            prefixes: VecDeque::new(),
        }
    }

    pub fn with_new_prefixes(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.clear();
        self.prefixes.push_back(prefix.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push_back(prefix.into());
        self
    }

    fn prefix(&self) -> String {
        self.prefixes.iter().map(|p| format!("{} ", p)).collect()
    }

    pub fn info(&self, message: &str) {
        tracing::info!("{}{}", self.prefix(), message);
    }

    pub fn error(&self, message: &str) {
        tracing::error!("{}{}", self.prefix(), message);
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!("{}{}", self.prefix(), message);
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!("{}{}", self.prefix(), message);
    }
}

/// Parses a level name, falling back to INFO for anything unknown.
pub fn parse_level(name: &str) -> Level {
    name.trim().parse().unwrap_or(Level::INFO)
}

/// Installs the stdout subscriber once and returns a fresh handle.
pub fn init_logging(level: Level) -> Logger {
    if !tracing::dispatcher::has_been_set() {
        INIT.call_once(|| {
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_target(false)
                .init();
        });
    }
    Logger::new()
}

use std::sync::Arc;

use dq_core::types::char_prefix;
use dq_core::{Logger, QuoteRecord, TrackingStore};
use sha2::{Digest, Sha256};

/// Body characters that take part in the fingerprint.
pub const FINGERPRINT_BODY_CHARS: usize = 200;

/// Digest over fetch date, title, and the start of the body.
pub fn fingerprint(quote: &QuoteRecord) -> String {
    let mut hasher = Sha256::new();
    hasher.update(quote.fetch_date.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(quote.title.as_bytes());
    hasher.update(b"|");
    hasher.update(char_prefix(&quote.body, FINGERPRINT_BODY_CHARS).as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeStatus {
    New { fingerprint: String },
    Unchanged { fingerprint: String },
}

impl ChangeStatus {
    pub fn is_new(&self) -> bool {
        matches!(self, ChangeStatus::New { .. })
    }

    pub fn fingerprint(&self) -> &str {
        match self {
            ChangeStatus::New { fingerprint } | ChangeStatus::Unchanged { fingerprint } => fingerprint,
        }
    }
}

pub struct ChangeDetector {
    store: Arc<dyn TrackingStore>,
    logger: Logger,
}

impl ChangeDetector {
    pub fn new(store: Arc<dyn TrackingStore>) -> Self {
        Self {
            store,
            logger: Logger::new().with_prefix("[dedup]"),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger.with_prefix("[dedup]");
        self
    }

    /// Compares `quote` against the last delivered record.
    pub async fn check(&self, quote: &QuoteRecord) -> ChangeStatus {
        let fingerprint = fingerprint(quote);

        match self.store.load().await {
            Some(previous) if previous.fingerprint == fingerprint => {
                self.logger.info(&format!(
                    "Quote already sent at {} ({})",
                    previous.sent_at, previous.title
                ));
                ChangeStatus::Unchanged { fingerprint }
            }
            Some(previous) => {
                self.logger.info(&format!(
                    "New quote detected (previous: {} on {})",
                    previous.title, previous.fetch_date
                ));
                ChangeStatus::New { fingerprint }
            }
            None => {
                self.logger.info("No previous quote recorded");
                ChangeStatus::New { fingerprint }
            }
        }
    }
}

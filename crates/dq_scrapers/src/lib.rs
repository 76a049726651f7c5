pub mod extract;
pub mod fallback;
pub mod fetcher;
pub mod manager;
pub mod text;

pub use extract::QuoteExtractor;
pub use fallback::{CannedQuote, FallbackPool};
pub use fetcher::{PageFetcher, RetryPolicy, GREATDAY_URL};
pub use manager::{AcquiredQuote, QuoteScraper};

pub mod prelude {
    pub use super::manager::QuoteScraper;
    pub use dq_core::{PageSource, QuoteRecord, Result, Error};
}

pub mod delivery;
pub mod error;
pub mod logging;
pub mod source;
pub mod storage;
pub mod types;

pub use delivery::MessageSink;
pub use error::{Error, Result};
pub use logging::{init_logging, parse_level, Logger};
pub use source::PageSource;
pub use storage::TrackingStore;
pub use types::{FetchedPage, QuoteOrigin, QuoteRecord, TrackingRecord};

use async_trait::async_trait;
use crate::types::TrackingRecord;
use crate::Result;

#[async_trait]
pub trait TrackingStore: Send + Sync {
    /// Load the last delivered record, `None` when nothing usable is stored
    async fn load(&self) -> Option<TrackingRecord>;

    /// Replace the stored record
    async fn save(&self, record: &TrackingRecord) -> Result<()>;
}

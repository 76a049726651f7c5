use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dq_core::{Result, TrackingRecord, TrackingStore};
use tokio::sync::RwLock;

/// Keeps the tracking record in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    record: Arc<RwLock<Option<TrackingRecord>>>,
    saves: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: TrackingRecord) -> Self {
        Self {
            record: Arc::new(RwLock::new(Some(record))),
            saves: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub async fn current(&self) -> Option<TrackingRecord> {
        self.record.read().await.clone()
    }

    /// Number of successful `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrackingStore for MemoryStore {
    async fn load(&self) -> Option<TrackingRecord> {
        self.record.read().await.clone()
    }

    async fn save(&self, record: &TrackingRecord) -> Result<()> {
        *self.record.write().await = Some(record.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

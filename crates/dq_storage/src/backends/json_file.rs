use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dq_core::{Error, Logger, Result, TrackingRecord, TrackingStore};

pub const DEFAULT_STATE_FILE: &str = "last_quote.json";

/// Tracking record persisted as a single pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    logger: Logger,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            logger: Logger::new().with_prefix("[state]"),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger.with_prefix("[state]");
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_STATE_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl TrackingStore for JsonFileStore {
    async fn load(&self) -> Option<TrackingRecord> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.logger.info(&format!(
                    "No previous record at {}, treating quote as new",
                    self.path.display()
                ));
                return None;
            }
            Err(e) => {
                self.logger.warn(&format!(
                    "Could not read {}: {}, treating as absent",
                    self.path.display(),
                    e
                ));
                return None;
            }
        };

        match serde_json::from_slice::<TrackingRecord>(&bytes) {
            Ok(record) => Some(record),
            Err(e) => {
                self.logger.warn(&format!(
                    "Ignoring malformed record in {}: {}",
                    self.path.display(),
                    e
                ));
                None
            }
        }
    }

    async fn save(&self, record: &TrackingRecord) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(record)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, &json).await?;
        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&temp).await {
                self.logger
                    .warn(&format!("Could not remove {}: {}", temp.display(), cleanup));
            }
            return Err(Error::Storage(format!(
                "Failed to move {} into place: {}",
                temp.display(),
                e
            )));
        }

        self.logger
            .info(&format!("Saved tracking record to {}", self.path.display()));
        Ok(())
    }
}

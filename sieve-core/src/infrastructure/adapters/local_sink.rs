// sieve-core/src/infrastructure/adapters/local_sink.rs

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::domain::dataset::Dataset;
use crate::error::SieveError;
use crate::infrastructure::adapters::tabular::write_dataset_file;
use crate::ports::sink::QuarantineSink;

/// Writes the quarantine CSV to one local file, replacing it atomically.
#[derive(Debug, Clone)]
pub struct LocalFileSink {
    path: PathBuf,
}

impl LocalFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl QuarantineSink for LocalFileSink {
    fn name(&self) -> &str {
        "local"
    }

    #[instrument(skip(self, quarantine), fields(path = %self.path.display(), rows = quarantine.len()))]
    async fn write(&self, quarantine: &Dataset) -> Result<String, SieveError> {
        let path = self.path.clone();
        // Blocking file IO off the runtime threads
        let data = quarantine.clone();
        tokio::task::spawn_blocking(move || write_dataset_file(&path, &data))
            .await
            .map_err(|e| SieveError::InternalError(format!("Local sink task failed: {e}")))??;

        info!("Invalid records have been saved locally");
        Ok(self.path.display().to_string())
    }
}

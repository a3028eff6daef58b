// sieve-core/src/infrastructure/adapters/unavailable_sink.rs

use async_trait::async_trait;
use tracing::warn;

use crate::domain::dataset::Dataset;
use crate::error::SieveError;
use crate::infrastructure::error::{InfrastructureError, StorageError};
use crate::ports::sink::QuarantineSink;

/// Stands in for a sink whose setup failed, so the failure shows up as a
/// failed write in the run report instead of stopping the run.
#[derive(Debug, Clone)]
pub struct UnavailableSink {
    name: String,
    reason: String,
}

impl UnavailableSink {
    pub fn new(name: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl QuarantineSink for UnavailableSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&self, quarantine: &Dataset) -> Result<String, SieveError> {
        warn!(sink = %self.name, rows = quarantine.len(), "Sink unavailable, records not written");
        Err(InfrastructureError::from(StorageError::Sink {
            sink: self.name.clone(),
            message: format!("setup failed: {}", self.reason),
        })
        .into())
    }
}

// sieve-core/src/ports/sink.rs

use async_trait::async_trait;

use crate::domain::dataset::Dataset;
use crate::error::SieveError;

/// Destination for quarantined rows. Writes are best-effort: the caller logs
/// failures and keeps going.
#[async_trait]
pub trait QuarantineSink: Send + Sync {
    fn name(&self) -> &str;

    /// Persists the quarantine dataset and returns where it landed.
    async fn write(&self, quarantine: &Dataset) -> Result<String, SieveError>;
}

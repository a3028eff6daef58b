// sieve-core/src/infrastructure/adapters/object_store_sink.rs

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use tracing::{info, instrument};

#[cfg(feature = "s3")]
use object_store::RetryConfig;
#[cfg(feature = "s3")]
use object_store::aws::AmazonS3Builder;

use crate::domain::dataset::Dataset;
use crate::error::SieveError;
use crate::infrastructure::adapters::tabular::dataset_to_csv;
use crate::infrastructure::config::ObjectStoreSettings;
use crate::infrastructure::error::{InfrastructureError, StorageError};
use crate::ports::sink::QuarantineSink;

/// Uploads the quarantine CSV under a date-partitioned key:
/// `{prefix}/{YYYY}/{MM}/{DD}/{process_id}_data_{YYYYMMDDHHMMSS}.csv`.
pub struct ObjectStoreSink {
    store: Arc<dyn ObjectStore>,
    /// Human-readable root used in reported locations (`s3://bucket`, a directory...).
    root: String,
    prefix: String,
    process_id: String,
}

impl fmt::Debug for ObjectStoreSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStoreSink")
            .field("root", &self.root)
            .field("prefix", &self.prefix)
            .field("process_id", &self.process_id)
            .finish()
    }
}

impl ObjectStoreSink {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        root: impl Into<String>,
        prefix: impl Into<String>,
        process_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            root: root.into(),
            prefix: prefix.into().trim_matches('/').to_string(),
            process_id: process_id.into(),
        }
    }

    /// Picks the backend from settings: `local_root` wins, otherwise the bucket.
    pub fn from_settings(
        settings: &ObjectStoreSettings,
        process_id: &str,
    ) -> Result<Self, InfrastructureError> {
        if let Some(root) = &settings.local_root {
            std::fs::create_dir_all(root)?;
            let store = LocalFileSystem::new_with_prefix(root)?;
            return Ok(Self::new(
                Arc::new(store),
                root.display().to_string(),
                &settings.prefix,
                process_id,
            ));
        }
        Self::s3(settings, process_id)
    }

    #[cfg(feature = "s3")]
    fn s3(settings: &ObjectStoreSettings, process_id: &str) -> Result<Self, InfrastructureError> {
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(&settings.bucket)
            .with_retry(RetryConfig {
                max_retries: 3,
                retry_timeout: std::time::Duration::from_secs(30),
                ..Default::default()
            });
        if let Some(region) = &settings.region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = &settings.endpoint {
            builder = builder.with_endpoint(endpoint);
        }
        let store = builder.build()?;
        Ok(Self::new(
            Arc::new(store),
            format!("s3://{}", settings.bucket),
            &settings.prefix,
            process_id,
        ))
    }

    #[cfg(not(feature = "s3"))]
    fn s3(settings: &ObjectStoreSettings, _process_id: &str) -> Result<Self, InfrastructureError> {
        Err(InfrastructureError::ConfigError(format!(
            "bucket '{}' needs the `s3` feature; set `local_root` to use a local directory instead",
            settings.bucket
        )))
    }

    pub fn object_key(&self, now: DateTime<Local>) -> ObjectPath {
        let file = format!(
            "{}_data_{}.csv",
            self.process_id,
            now.format("%Y%m%d%H%M%S")
        );
        let partition = now.format("%Y/%m/%d");
        if self.prefix.is_empty() {
            ObjectPath::from(format!("{partition}/{file}"))
        } else {
            ObjectPath::from(format!("{}/{partition}/{file}", self.prefix))
        }
    }
}

#[async_trait]
impl QuarantineSink for ObjectStoreSink {
    fn name(&self) -> &str {
        "object_store"
    }

    #[instrument(skip(self, quarantine), fields(root = %self.root, rows = quarantine.len()))]
    async fn write(&self, quarantine: &Dataset) -> Result<String, SieveError> {
        let key = self.object_key(Local::now());
        let body = dataset_to_csv(quarantine)?;

        self.store
            .put(&key, PutPayload::from(body))
            .await
            .map_err(|e| InfrastructureError::from(StorageError::ObjectStore(e)))?;

        let location = format!("{}/{}", self.root, key);
        info!(location = %location, "Invalid records have been uploaded");
        Ok(location)
    }
}

// sieve-core/src/infrastructure/config/settings.rs

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::infrastructure::error::InfrastructureError;

fn default_prefix() -> String {
    "data_quality".to_string()
}

/// Where quarantined rows and run reports go.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct QuarantineSettings {
    /// File the local quarantine CSV is written to.
    #[serde(default)]
    pub local_path: Option<PathBuf>,
    /// Directory for `run_results.json`.
    #[serde(default)]
    pub report_dir: Option<PathBuf>,
    #[serde(default)]
    #[validate(nested)]
    pub object_store: Option<ObjectStoreSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ObjectStoreSettings {
    #[validate(length(min = 1, message = "bucket cannot be empty"))]
    pub bucket: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default = "default_prefix")]
    #[validate(length(min = 1, message = "prefix cannot be empty"))]
    pub prefix: String,
    /// Custom endpoint (MinIO, localstack...).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Use a local directory as the object store root instead of a remote bucket.
    #[serde(default)]
    pub local_root: Option<PathBuf>,
}

impl ObjectStoreSettings {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: None,
            prefix: default_prefix(),
            endpoint: None,
            local_root: None,
        }
    }
}

impl QuarantineSettings {
    // Layering: YAML first, then environment.
    // SIEVE_BUCKET=dq-bucket sieve run ...
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("SIEVE_INVALID_FILE") {
            info!(old = ?self.local_path, new = %val, "Overriding quarantine file via ENV");
            self.local_path = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup("SIEVE_REPORT_DIR") {
            info!(old = ?self.report_dir, new = %val, "Overriding report dir via ENV");
            self.report_dir = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup("SIEVE_BUCKET") {
            info!(new = %val, "Overriding bucket via ENV");
            match self.object_store.as_mut() {
                Some(store) => store.bucket = val,
                None => self.object_store = Some(ObjectStoreSettings::new(val)),
            }
        }
        if let Some(store) = self.object_store.as_mut() {
            if let Some(val) = lookup("SIEVE_REGION") {
                info!(old = ?store.region, new = %val, "Overriding region via ENV");
                store.region = Some(val);
            }
            if let Some(val) = lookup("SIEVE_DATA_QUALITY_PATH") {
                info!(old = %store.prefix, new = %val, "Overriding object prefix via ENV");
                store.prefix = val;
            }
        }
    }

    pub fn check(&self) -> Result<(), InfrastructureError> {
        self.validate()
            .map_err(|e| InfrastructureError::ConfigError(format!("quarantine: {e}")))
    }
}

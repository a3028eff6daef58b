// sieve-core/src/domain/file_check.rs

use serde::{Deserialize, Serialize};

fn default_max_size_mb() -> f64 {
    100.0
}

/// Physical checks applied to an input file before its content is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name")]
pub enum FileCheck {
    ValidateFileFormat {
        allowed_extensions: Vec<String>,
    },
    ValidateFileSize {
        #[serde(default = "default_max_size_mb")]
        max_size_mb: f64,
    },
    ValidateCompressed {
        allowed_compressions: Vec<String>,
    },
    ValidateFileDate {
        /// `YYYY-MM-DD`. Missing or malformed dates fail the check, not the load.
        #[serde(default)]
        business_date: Option<String>,
    },
}

impl FileCheck {
    pub fn check_name(&self) -> &'static str {
        match self {
            FileCheck::ValidateFileFormat { .. } => "File Format",
            FileCheck::ValidateFileSize { .. } => "File Size",
            FileCheck::ValidateCompressed { .. } => "Compressed File",
            FileCheck::ValidateFileDate { .. } => "File Date",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileCheckResult {
    pub check_name: String,
    pub passed: bool,
    pub details: String,
}

impl FileCheckResult {
    pub fn new(check: &FileCheck, passed: bool, details: impl Into<String>) -> Self {
        Self {
            check_name: check.check_name().to_string(),
            passed,
            details: details.into(),
        }
    }
}

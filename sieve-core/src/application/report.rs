// sieve-core/src/application/report.rs

use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::expectation::ExpectationResult;
use crate::domain::file_check::FileCheckResult;
use crate::domain::policy::{Action, ExpectationPolicy};
use crate::error::SieveError;

pub const REPORT_FILE_NAME: &str = "run_results.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectationSummary {
    pub expectation_id: String,
    pub column: String,
    pub success: bool,
    pub unexpected_count: usize,
    /// Disposition configured for this pair, if any.
    #[serde(default)]
    pub action: Option<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ExpectationSummary {
    pub fn from_result(result: &ExpectationResult, policy: &ExpectationPolicy) -> Self {
        Self {
            expectation_id: result.expectation_id.clone(),
            column: result.target.to_string(),
            success: result.success,
            unexpected_count: result.violating_indices.len(),
            action: policy.get(&result.expectation_id, &result.target),
            details: result.details.clone(),
        }
    }
}

/// What happened to one quarantine sink. Failures are recorded, not raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkOutcome {
    pub sink: String,
    pub success: bool,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SinkOutcome {
    pub fn written(sink: &str, location: String) -> Self {
        Self {
            sink: sink.to_string(),
            success: true,
            location: Some(location),
            error: None,
        }
    }

    pub fn failed(sink: &str, error: impl ToString) -> Self {
        Self {
            sink: sink.to_string(),
            success: false,
            location: None,
            error: Some(error.to_string()),
        }
    }
}

/// Summary of a completed validation run, persisted as `run_results.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_at: String,
    pub process_id: String,
    pub engine: String,
    pub source: Option<String>,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    pub quarantine_records: usize,
    pub file_checks: Vec<FileCheckResult>,
    pub expectations: Vec<ExpectationSummary>,
    pub sinks: Vec<SinkOutcome>,
}

impl RunReport {
    pub fn new(process_id: &str, engine: &str) -> Self {
        Self {
            run_at: Local::now().to_rfc3339(),
            process_id: process_id.to_string(),
            engine: engine.to_string(),
            source: None,
            total_rows: 0,
            valid_rows: 0,
            invalid_rows: 0,
            quarantine_records: 0,
            file_checks: Vec::new(),
            expectations: Vec::new(),
            sinks: Vec::new(),
        }
    }

    pub fn failed_expectations(&self) -> impl Iterator<Item = &ExpectationSummary> {
        self.expectations.iter().filter(|e| !e.success)
    }

    pub fn failed_file_checks(&self) -> impl Iterator<Item = &FileCheckResult> {
        self.file_checks.iter().filter(|c| !c.passed)
    }

    pub fn failed_sinks(&self) -> impl Iterator<Item = &SinkOutcome> {
        self.sinks.iter().filter(|s| !s.success)
    }

    /// Writes `run_results.json` into `dir` and returns its path.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, SieveError> {
        let path = dir.join(REPORT_FILE_NAME);
        save_json(&path, self)?;
        info!(path = %path.display(), "Run report saved");
        Ok(path)
    }
}

fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), SieveError> {
    let content = serde_json::to_string_pretty(data)
        .map_err(|e| SieveError::InternalError(format!("Serialization: {}", e)))?;
    crate::infrastructure::fs::atomic_write(path, content)?;
    Ok(())
}

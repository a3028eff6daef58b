// sieve-core/src/domain/expectation/result.rs

use serde::{Deserialize, Serialize};

use super::kind::TargetColumn;

/// Normalized outcome of one expectation, as produced by an engine adapter.
///
/// `violating_indices` are positions in the dataset snapshot the engine saw.
/// A failed result may carry no indices (aggregate checks, or engines that do
/// not localize failures).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectationResult {
    pub expectation_id: String,
    pub target: TargetColumn,
    pub success: bool,
    #[serde(default)]
    pub violating_indices: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ExpectationResult {
    pub fn passed(expectation_id: impl Into<String>, target: TargetColumn) -> Self {
        Self {
            expectation_id: expectation_id.into(),
            target,
            success: true,
            violating_indices: Vec::new(),
            details: None,
        }
    }

    pub fn failed(
        expectation_id: impl Into<String>,
        target: TargetColumn,
        violating_indices: Vec<usize>,
    ) -> Self {
        Self {
            expectation_id: expectation_id.into(),
            target,
            success: false,
            violating_indices,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

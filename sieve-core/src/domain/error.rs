// sieve-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Policy violation: expectation '{expectation_id}' failed on column '{column}'")]
    #[diagnostic(
        code(sieve::domain::policy_violation),
        help("This expectation is configured with action 'failure'. Fix the source data or relax the action to 'skip'.")
    )]
    PolicyViolation {
        expectation_id: String,
        column: String,
    },

    #[error(
        "Expectation '{expectation_id}' reported row {index}, but the dataset only has {len} rows"
    )]
    #[diagnostic(
        code(sieve::domain::index_out_of_range),
        help("The engine result does not belong to this dataset snapshot.")
    )]
    IndexOutOfRange {
        expectation_id: String,
        index: usize,
        len: usize,
    },

    #[error("Row {row} has {found} values but the dataset declares {expected} columns")]
    #[diagnostic(code(sieve::domain::row_width))]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid expectation '{name}': {reason}")]
    #[diagnostic(code(sieve::domain::expectation))]
    InvalidExpectation { name: String, reason: String },
}

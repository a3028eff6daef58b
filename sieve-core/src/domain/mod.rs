// sieve-core/src/domain/mod.rs

pub mod classifier;
pub mod dataset;
pub mod error;
pub mod expectation;
pub mod file_check;
pub mod policy;

// Re-exports pratiques pour simplifier les imports ailleurs
pub use classifier::{AbortReason, Outcome, Partition, QuarantinedRow, RowClassifier};
pub use dataset::Dataset;
pub use error::DomainError;
pub use policy::{Action, ExpectationPolicy};

// sieve-core/src/application/mod.rs

pub mod processor;
pub mod report;

// --- RE-EXPORTS (FACADE PATTERN) ---
// Cela permet au CLI de faire :
// `use sieve_core::application::{ValidationProcessor, RunOutcome};`
// sans avoir à connaître la structure interne des fichiers.

pub use processor::{RunOutcome, ValidationProcessor, build_sinks};
pub use report::{ExpectationSummary, RunReport, SinkOutcome};

// sieve-core/src/infrastructure/engine/mod.rs
//
// ExpectationEngine implementations: in-process evaluation, or replay of
// results produced by an external validation framework.

pub mod native;
pub mod recorded;

pub use native::NativeEngine;
pub use recorded::RecordedResultsEngine;

// sieve-core/src/ports/engine.rs

// What the pipeline needs from an expectation engine, without knowing which one.
// The engine owns whatever session state it needs; the caller owns the engine.

use async_trait::async_trait;

use crate::domain::dataset::Dataset;
use crate::domain::expectation::{ExpectationKind, ExpectationResult};
use crate::error::SieveError;

#[async_trait]
pub trait ExpectationEngine: Send + Sync {
    fn name(&self) -> &str;

    /// One result per expectation, in declaration order.
    /// Violating indices refer to positions in `dataset`.
    async fn evaluate(
        &self,
        dataset: &Dataset,
        expectations: &[ExpectationKind],
    ) -> Result<Vec<ExpectationResult>, SieveError>;
}

// sieve-core/src/ports/mod.rs

pub mod engine;
pub mod sink;

pub use engine::ExpectationEngine;
pub use sink::QuarantineSink;

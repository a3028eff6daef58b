// sieve-core/src/infrastructure/mod.rs

pub mod adapters;
pub mod config;
pub mod engine;
pub mod error;
pub mod file_validation;
pub mod fs;

pub use file_validation::FileValidator;

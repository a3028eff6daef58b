// sieve-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum StorageError {
    #[error("Object Store Error: {0}")]
    #[diagnostic(
        code(sieve::infra::storage::object_store),
        help("Check bucket name, region and credentials.")
    )]
    ObjectStore(#[from] object_store::Error),

    #[error("Sink '{sink}' failed: {message}")]
    #[diagnostic(code(sieve::infra::storage::sink))]
    Sink { sink: String, message: String },
}

#[derive(Error, Debug, Diagnostic)]
pub enum QueryError {
    #[error("DataFusion Engine Error: {0}")]
    #[diagnostic(
        code(sieve::infra::query::datafusion),
        help("An error occurred inside the SQL engine while evaluating an expectation.")
    )]
    DataFusion(#[from] datafusion::error::DataFusionError),
}

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- QUERY ENGINE (Abstracted) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Query(#[from] QueryError),

    // --- STORAGE (Abstracted) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Storage(#[from] StorageError),

    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(sieve::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(sieve::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(sieve::infra::config))]
    ConfigError(String),

    #[error("Validation configuration not found at '{0}'")]
    #[diagnostic(code(sieve::infra::config_missing))]
    ConfigNotFound(String),

    // --- DATA FILES ---
    #[error("CSV Error: {0}")]
    #[diagnostic(
        code(sieve::infra::csv),
        help("Check the delimiter, quoting and that every record has the same number of fields.")
    )]
    Csv(#[from] csv::Error),

    #[error("Engine result parsing error: {0}")]
    #[diagnostic(code(sieve::infra::results))]
    ResultFormat(#[from] serde_json::Error),

    #[error("Unrecognised results document: {0}")]
    #[diagnostic(
        code(sieve::infra::results_shape),
        help("Expected a checkpoint result with 'run_results' or a validation result with 'results'.")
    )]
    MalformedResults(String),
}

// Manual implementation for shortcuts (e.g. `?` on object_store calls)
impl From<object_store::Error> for InfrastructureError {
    fn from(err: object_store::Error) -> Self {
        InfrastructureError::Storage(StorageError::ObjectStore(err))
    }
}

// Manual implementation for shortcuts (e.g. `?` on DataFusion calls)
impl From<datafusion::error::DataFusionError> for InfrastructureError {
    fn from(err: datafusion::error::DataFusionError) -> Self {
        InfrastructureError::Query(QueryError::DataFusion(err))
    }
}

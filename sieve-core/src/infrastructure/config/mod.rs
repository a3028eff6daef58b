// sieve-core/src/infrastructure/config/mod.rs

pub mod settings;
pub mod validation;

pub use settings::{ObjectStoreSettings, QuarantineSettings};
pub use validation::{ValidationConfig, load_validation_config, parse_validation_config};

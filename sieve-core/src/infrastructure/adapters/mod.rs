// sieve-core/src/infrastructure/adapters/mod.rs

pub mod local_sink;
pub mod object_store_sink;
pub mod tabular;
pub mod unavailable_sink;

pub use local_sink::LocalFileSink;
pub use object_store_sink::ObjectStoreSink;
pub use tabular::CsvOptions;
pub use unavailable_sink::UnavailableSink;

// sieve/src/commands/mod.rs

pub mod check_file;
pub mod expectations;
pub mod run;

// sieve/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sieve")]
#[command(about = "Row-level data quality gate: expectations, quarantine and fail-fast policies", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚦 Validates a data file, quarantines invalid rows or aborts on a failure policy
    Run(RunArgs),

    /// 📁 Runs the configured file checks (format, size, compression, date)
    CheckFile {
        /// Validation configuration (YAML)
        #[arg(long, short, env = "SIEVE_CONFIG")]
        config: PathBuf,

        /// File or directory to check
        path: PathBuf,

        /// Exit with error if any check fails
        #[arg(long)]
        check: bool,
    },

    /// 📚 Lists the supported expectations
    Expectations {
        /// Only show one category (schema, completeness, uniqueness, validity, numeric)
        #[arg(long)]
        category: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Validation configuration (YAML)
    #[arg(long, short, env = "SIEVE_CONFIG")]
    pub config: PathBuf,

    /// Data file to validate (CSV, optionally gzipped)
    #[arg(long, short)]
    pub data: PathBuf,

    /// Identifier of the feeding process, used in quarantine object keys
    #[arg(long, env = "SIEVE_PROCESS_ID")]
    pub process_id: String,

    /// Local quarantine file (overrides the config)
    #[arg(long)]
    pub invalid_file: Option<PathBuf>,

    /// Replay results exported by an external validation run instead of evaluating natively
    #[arg(long)]
    pub results: Option<PathBuf>,

    /// The data file has no header row
    #[arg(long)]
    pub no_header: bool,

    /// Column names, comma separated (required with --no-header)
    #[arg(long, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,

    /// Write the valid rows to this CSV file
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Directory for run_results.json (overrides the config)
    #[arg(long)]
    pub report_dir: Option<PathBuf>,
}

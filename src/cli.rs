//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::matching::{AngelOnlyPolicy, LookupStrategy};
use crate::report::Column;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// InvestorMatch - rank investors for a startup's fundraising targets
///
/// Expands the startup's verticals, funding stages and locations into
/// combinations, aggregates matching historical investments per investor,
/// and prints a ranked list of institutional and angel investors.
///
/// Examples:
///   investormatch --request request.json --dataset investors.json
///   investormatch --request request.json --format csv -o matches.csv
///   investormatch --request request.json --filter capital --page 2
///   investormatch --request request.json --dry-run
///   investormatch --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Match request JSON file (startupData / fundraisingData)
    ///
    /// Use `-` to read the request from stdin.
    #[arg(short, long, value_name = "FILE", required_unless_present = "init_config")]
    pub request: Option<PathBuf>,

    /// Investor dataset JSON file
    ///
    /// Holds the `investments`, `investors` and `angels` collections.
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "dataset.json",
        env = "INVESTORMATCH_DATASET"
    )]
    pub dataset: PathBuf,

    /// Output file path for the report (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (json, markdown, csv)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Only show investors whose website or type contains TEXT
    #[arg(long, value_name = "TEXT")]
    pub filter: Option<String>,

    /// Page of the ranked list to show (1-based)
    #[arg(long, default_value = "1", value_name = "N")]
    pub page: usize,

    /// Entries per page (0 shows everything)
    #[arg(long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Columns to show (comma-separated)
    ///
    /// Example: --columns rank,website,matched-total
    #[arg(long, value_name = "COLS", value_delimiter = ',')]
    pub columns: Option<Vec<Column>>,

    /// Ledger lookup strategy
    #[arg(long, value_name = "STRATEGY")]
    pub strategy: Option<LookupStrategy>,

    /// Maximum concurrent ledger lookups (fan-out strategy)
    #[arg(long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// Per-lookup timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Retries after a transient store failure
    #[arg(long, value_name = "NUM")]
    pub retries: Option<usize>,

    /// Maximum number of angel investors fetched
    #[arg(long, value_name = "NUM")]
    pub angel_limit: Option<usize>,

    /// Institutional lookup when only angels are requested
    #[arg(long, value_name = "POLICY")]
    pub angel_only_policy: Option<AngelOnlyPolicy>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .investormatch.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: print the combinations that would be queried and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Exit with code 2 when no investors match
    #[arg(long)]
    pub fail_on_empty: bool,

    /// Generate a default .investormatch.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref request) = self.request {
            if request.as_os_str() != "-" && !request.is_file() {
                return Err(format!("Request file does not exist: {}", request.display()));
            }
        }

        if !self.dry_run && !self.dataset.is_file() {
            return Err(format!(
                "Dataset file does not exist: {}",
                self.dataset.display()
            ));
        }

        if self.page == 0 {
            return Err("Page must be at least 1".to_string());
        }

        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if let Some(ref columns) = self.columns {
            if columns.is_empty() {
                return Err("At least one column must be selected".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.investormatch.toml` files.

use crate::cli::OutputFormat;
use crate::matching::{AngelOnlyPolicy, LookupStrategy};
use crate::report::Column;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE: &str = ".investormatch.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Matching engine settings.
    #[serde(default)]
    pub matching: MatchingConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path; stdout when unset.
    #[serde(default)]
    pub output: Option<String>,

    /// Default report format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Matching engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Ledger lookup strategy.
    #[serde(default)]
    pub strategy: LookupStrategy,

    /// Maximum concurrent ledger lookups in fan-out mode.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-lookup timeout in seconds.
    #[serde(default = "default_timeout")]
    pub lookup_timeout_seconds: u64,

    /// Retries after a transient store failure.
    #[serde(default = "default_retries")]
    pub retries: usize,

    /// Base retry delay in milliseconds, doubled per attempt.
    #[serde(default = "default_backoff")]
    pub retry_backoff_ms: u64,

    /// Maximum number of angel investors fetched.
    #[serde(default = "default_angel_limit")]
    pub angel_limit: usize,

    /// Institutional lookup when only angels are requested.
    #[serde(default)]
    pub angel_only_policy: AngelOnlyPolicy,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            strategy: LookupStrategy::default(),
            concurrency: default_concurrency(),
            lookup_timeout_seconds: default_timeout(),
            retries: default_retries(),
            retry_backoff_ms: default_backoff(),
            angel_limit: default_angel_limit(),
            angel_only_policy: AngelOnlyPolicy::default(),
        }
    }
}

fn default_concurrency() -> usize {
    4
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> usize {
    3
}

fn default_backoff() -> u64 {
    200
}

fn default_angel_limit() -> usize {
    crate::matching::resolver::DEFAULT_ANGEL_LIMIT
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Entries per page (0 shows everything).
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Columns shown in Markdown and CSV output.
    #[serde(default = "default_columns")]
    pub columns: Vec<Column>,

    /// Show the per-combination matched counts column.
    #[serde(default = "default_true")]
    pub include_counts: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            columns: default_columns(),
            include_counts: true,
        }
    }
}

fn default_page_size() -> usize {
    25
}

fn default_columns() -> Vec<Column> {
    Column::defaults().to_vec()
}

fn default_true() -> bool {
    true
}

impl ReportConfig {
    /// Columns to render, honoring `include_counts`.
    pub fn effective_columns(&self) -> Vec<Column> {
        self.columns
            .iter()
            .copied()
            .filter(|c| self.include_counts || *c != Column::MatchedCounts)
            .collect()
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.investormatch.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }
        if args.verbose {
            self.general.verbose = true;
        }

        if let Some(strategy) = args.strategy {
            self.matching.strategy = strategy;
        }
        if let Some(concurrency) = args.concurrency {
            self.matching.concurrency = concurrency;
        }
        if let Some(timeout) = args.timeout {
            self.matching.lookup_timeout_seconds = timeout;
        }
        if let Some(retries) = args.retries {
            self.matching.retries = retries;
        }
        if let Some(limit) = args.angel_limit {
            self.matching.angel_limit = limit;
        }
        if let Some(policy) = args.angel_only_policy {
            self.matching.angel_only_policy = policy;
        }

        if let Some(page_size) = args.page_size {
            self.report.page_size = page_size;
        }
        if let Some(ref columns) = args.columns {
            self.report.columns = columns.clone();
        }
    }

    /// Log level after merging: --quiet wins, then `verbose` from either
    /// the config file or the CLI.
    pub fn log_level(&self, args: &crate::cli::Args) -> tracing::Level {
        if args.quiet {
            tracing::Level::ERROR
        } else if self.general.verbose {
            tracing::Level::DEBUG
        } else {
            args.log_level()
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

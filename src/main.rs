//! InvestorMatch - rank investors for a startup's fundraising targets
//!
//! A CLI tool that expands a startup profile into (vertical, stage,
//! location) combinations, aggregates historical investments per investor
//! from an investor dataset, and renders a ranked list of institutional and
//! angel investors.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing files, bad request, store failure, etc.)
//!   2 - No investors matched and --fail-on-empty was set

mod api;
mod cli;
mod config;
mod error;
mod matching;
mod models;
mod report;
mod store;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use matching::{LookupStrategy, MatchEngine, MatchSettings};
use models::{MatchRequest, StartupProfile};
use report::view::{filter_matches, paginate, with_ranks};
use report::{MatchReport, ReportMetadata};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use store::{DatasetStore, StoreHandle};
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration before logging so its verbosity applies
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(config.log_level(&args));

    info!("InvestorMatch v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    match source {
        ConfigSource::File(path) => info!("Loaded config from: {}", path.display()),
        ConfigSource::Defaults => debug!("No config file found, using defaults"),
        ConfigSource::Invalid(reason) => warn!("Failed to load config: {}", reason),
    }

    match run_match(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Matching failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .investormatch.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize lookup strategy, retries, columns, and more.");
    Ok(())
}

/// Initialize logging at the given level.
///
/// Logs go to stderr so a report printed to stdout stays clean. `RUST_LOG`
/// overrides the level chosen by --verbose / --quiet and the config file.
fn init_logging(level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete matching workflow. Returns exit code (0 or 2).
async fn run_match(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();

    let body = read_request(&args)?;
    let request: MatchRequest =
        serde_json::from_slice(&body).context("Failed to parse match request")?;
    let profile = request.profile();

    // Handle --dry-run: print the query plan and exit
    if args.dry_run {
        return handle_dry_run(&profile, &config);
    }

    let store = DatasetStore::load(&args.dataset)?;
    let mut settings = MatchSettings::from(&config.matching);
    settings.show_progress = !args.quiet && settings.strategy == LookupStrategy::FanOut;
    let engine = MatchEngine::new(StoreHandle::shared(Arc::new(store)), settings);

    let matches = api::process(&engine, "POST", &body).await?;
    let total_matches = matches.len();
    let duration = start_time.elapsed().as_secs_f64();

    let filter = args.filter.as_deref().unwrap_or("");
    let entries = filter_matches(with_ranks(matches), filter);
    if !filter.is_empty() {
        info!("{} of {} investors match filter '{}'", entries.len(), total_matches, filter);
    }

    let mut metadata = ReportMetadata::new(&profile, total_matches, duration);
    metadata.filter = args.filter.clone();

    let report = MatchReport {
        metadata,
        page: paginate(entries, args.page, config.report.page_size),
    };
    if report.page.number != args.page {
        warn!(
            "Page {} is out of range, showing page {} of {}",
            args.page, report.page.number, report.page.total_pages
        );
    }

    // Render and save the report
    let columns = config.report.effective_columns();
    let output = match config.general.format {
        OutputFormat::Json => report::generator::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generator::generate_markdown_report(&report, &columns),
        OutputFormat::Csv => report::generator::generate_csv_report(&report.page.entries, &columns),
    };

    match config.general.output.as_deref().filter(|p| !p.is_empty()) {
        Some(path) => {
            report::generator::write_report(&output, Path::new(path))
                .with_context(|| format!("Failed to write report to {}", path))?;

            if !args.quiet {
                println!("\n📊 Match Summary:");
                println!("   Combinations queried: {}", report.metadata.combinations);
                println!("   Investors matched: {}", total_matches);
                println!("   Duration: {:.1}s", duration);
                println!("\n✅ Report saved to: {}", path);
            }
        }
        None => print!("{}", output),
    }

    if args.fail_on_empty && total_matches == 0 {
        eprintln!("\n⛔ No investors matched. Failing (exit code 2).");
        return Ok(2);
    }

    Ok(0)
}

/// Read the request body from the request file, or stdin for `-`.
fn read_request(args: &Args) -> Result<Vec<u8>> {
    let path = args
        .request
        .as_deref()
        .context("A request file is required")?;

    if path.as_os_str() == "-" {
        let mut body = Vec::new();
        std::io::stdin()
            .read_to_end(&mut body)
            .context("Failed to read request from stdin")?;
        return Ok(body);
    }

    std::fs::read(path).with_context(|| format!("Failed to read request file: {}", path.display()))
}

/// Handle --dry-run: print the combinations and lookups a run would issue.
fn handle_dry_run(profile: &StartupProfile, config: &Config) -> Result<i32> {
    println!("\n🔍 Dry run: query plan (no lookups)...\n");

    let plan = MatchEngine::plan(profile);
    if plan.is_empty() {
        println!("   No combinations: verticals, stages and locations are all required.");
    } else {
        println!("   {} combinations would be queried:\n", plan.len());
        for key in &plan {
            println!("     🔑 {}", key.label());
        }
    }

    let institutional = profile.institutional_types();
    println!("\n   Strategy: {:?}", config.matching.strategy);
    if institutional.is_empty() && !profile.wants_angels() {
        println!("   Institutional types: any");
    } else if institutional.is_empty() {
        println!(
            "   Institutional types: none (angel-only policy: {:?})",
            config.matching.angel_only_policy
        );
    } else {
        println!("   Institutional types: {}", institutional.join(", "));
    }
    println!(
        "   Angel investors: {}",
        if profile.wants_angels() {
            "queried"
        } else {
            "skipped"
        }
    );

    println!("\n✅ Dry run complete. No lookups were made.");
    Ok(0)
}

/// Where the effective configuration came from.
enum ConfigSource {
    File(PathBuf),
    Defaults,
    /// The default config file exists but could not be parsed.
    Invalid(String),
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so the source is returned for logging
/// afterwards.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::File(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigSource::File(PathBuf::from(CONFIG_FILE)))),
        Ok(None) => Ok((Config::default(), ConfigSource::Defaults)),
        Err(e) => Ok((Config::default(), ConfigSource::Invalid(format!("{:#}", e)))),
    }
}

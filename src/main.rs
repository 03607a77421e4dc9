//! worklog-digest - biweekly work-log summarizer
//!
//! A CLI tool that aggregates per-employee spreadsheet work logs,
//! summarizes the trailing two weeks per employee through a
//! text-generation API, and emails the digest on a fixed biweekly
//! schedule.
//!
//! Exit codes:
//!   0 - Success (including days with nothing scheduled)
//!   1 - Runtime error (bad input tree, config, summarization failure)

mod cli;
mod config;
mod dispatch;
mod llm;
mod logs;
mod mail;
mod models;
mod schedule;
mod summary;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use cli::Args;
use config::Config;
use llm::OpenAiClient;
use mail::SmtpMailer;
use models::ScheduleEntry;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

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

    // Initialize logging
    init_logging(&args);

    info!("worklog-digest v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the digest
    match run_digest(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Digest run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default worklog.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  worklog.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write worklog.toml")?;

    println!("✅ Created worklog.toml with default settings.");
    println!("   Edit it to set the log directory, API key, and mail addresses.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete digest workflow.
///
/// The steps run strictly in order: aggregation completes before
/// filtering, filtering before summary building, and every summary is
/// built before the schedule is consulted.
async fn run_digest(args: Args) -> Result<()> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let today = args.date.unwrap_or_else(|| Local::now().date_naive());
    info!("Running digest for {}", today);

    // Step 1: aggregate the work logs
    println!(
        "📂 Aggregating work logs from {}",
        config.paths.root_directory.display()
    );
    let unified = logs::aggregate(&config.paths.root_directory)?;
    logs::write_artifact(&unified, &config.paths.combined_output)?;
    println!(
        "   {} entries combined into {}",
        unified.len(),
        config.paths.combined_output.display()
    );

    // Step 2: narrow to the trailing window
    let filtered = logs::filter_window(&unified, today, config.window.days);
    logs::write_artifact(&filtered, &config.paths.filtered_output)?;
    println!(
        "🔍 {} entries within the last {} days, saved to {}",
        filtered.len(),
        config.window.days,
        config.paths.filtered_output.display()
    );

    // Step 3: generate the sending schedule
    let entries = schedule::generate(
        config.schedule.anchor_date,
        &config.schedule.roster,
        config.schedule.interval_days,
        config.schedule.horizon_days,
    );
    debug!("Generated {} schedule entries", entries.len());

    // Handle --dry-run: show who is due and exit
    if args.dry_run {
        return handle_dry_run(&entries, today);
    }

    // Step 4: build the per-employee summaries
    println!("🤖 Summarizing notes with {}", config.model.name);
    let summarizer = OpenAiClient::new(&config.model);
    let reports = summary::build_reports(&filtered, &summarizer, !args.quiet)
        .await
        .context("Failed to build employee summaries")?;
    println!("   {} report(s) built", reports.len());

    // Step 5: dispatch anything due today
    println!("📅 Checking the schedule for {}", today);
    if dispatch::due_entries(&entries, today).is_empty() {
        println!("   Nothing scheduled for today.");
    } else {
        // Sending is best-effort: a broken mail setup is logged, not fatal.
        match SmtpMailer::new(&config.smtp) {
            Ok(mailer) => {
                let outcome =
                    dispatch::dispatch(&entries, &reports, &mailer, &config.smtp.subject, today)
                        .await;
                println!(
                    "📧 {} of {} scheduled digest(s) sent",
                    outcome.sent, outcome.matched
                );
            }
            Err(e) => {
                error!("Failed to configure the SMTP mailer: {e:?}");
                println!("⚠️  Digest(s) due today could not be sent (mailer configuration failed).");
            }
        }
    }

    println!("\n✅ Digest run complete.");
    Ok(())
}

/// Handle --dry-run: report the schedule position without external calls.
fn handle_dry_run(entries: &[ScheduleEntry], today: NaiveDate) -> Result<()> {
    println!("\n🔍 Dry run: no summaries were generated, no mail was sent.\n");

    let due = dispatch::due_entries(entries, today);
    if due.is_empty() {
        println!("   Nothing scheduled for {}.", today);
        if let Some(next) = schedule::due_dates(entries).into_iter().find(|d| *d > today) {
            println!("   Next digest is due {}.", next);
        }
    } else {
        for entry in due {
            println!("   Digest due today for: {}", entry.roster.join(", "));
        }
    }

    println!("\n✅ Dry run complete.");
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from worklog.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// worklog-digest - biweekly work-log summarizer
///
/// Aggregates per-employee spreadsheet work logs, summarizes the trailing
/// two weeks per employee through a text-generation API, and emails the
/// digest to the configured recipients when today is a scheduled send day.
///
/// Examples:
///   worklog-digest
///   worklog-digest --root ./work_logs --date 2024-12-14
///   worklog-digest --dry-run
///   worklog-digest --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Root directory containing per-employee work-log folders
    ///
    /// Each subdirectory is one employee; each workbook sheet is one
    /// reporting period. Overrides the config file setting.
    #[arg(short, long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Model to use for note summarization
    ///
    /// Can also be set via WORKLOG_MODEL env var or worklog.toml config.
    #[arg(short, long, default_value = "gpt-4o-mini", env = "WORKLOG_MODEL")]
    pub model: String,

    /// Chat-completions API base URL
    #[arg(long, default_value = "https://api.openai.com/v1", env = "WORKLOG_API_URL")]
    pub api_url: String,

    /// API key for the text-generation service
    ///
    /// Overrides the config file setting.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for worklog.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Trailing window length in days
    ///
    /// Entries older than this are left out of the digest. Default: 14.
    #[arg(long, value_name = "DAYS")]
    pub window_days: Option<u32>,

    /// Treat this date as "today" (YYYY-MM-DD)
    ///
    /// Pins both the trailing window and the schedule check, for
    /// reproducible runs. Defaults to the current local date.
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// Request timeout in seconds
    ///
    /// How long to wait for the text-generation API to respond.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: aggregate and filter only
    ///
    /// Writes both artifacts and shows who would receive a digest today,
    /// without calling the text-generation API or sending mail.
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default worklog.toml configuration file
    #[arg(long)]
    pub init_config: bool,
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

        // Validate API URL format (not needed for dry-run)
        if !self.dry_run
            && !self.api_url.starts_with("http://")
            && !self.api_url.starts_with("https://")
        {
            return Err("API URL must start with 'http://' or 'https://'".to_string());
        }

        // Validate window length
        if let Some(days) = self.window_days {
            if days == 0 {
                return Err("Window length must be at least 1 day".to_string());
            }
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate root directory if provided
        if let Some(ref root) = self.root {
            if !root.exists() {
                return Err(format!("Root directory does not exist: {}", root.display()));
            }
            if !root.is_dir() {
                return Err(format!("Root path is not a directory: {}", root.display()));
            }
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

//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `worklog.toml` files.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "worklog.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Input/output paths.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Text-generation model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Trailing-window settings.
    #[serde(default)]
    pub window: WindowConfig,

    /// Sending-schedule settings.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Mail submission settings.
    #[serde(default)]
    pub smtp: SmtpConfig,
}

/// Filesystem paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root directory holding one subdirectory of workbooks per employee.
    #[serde(default = "default_root_directory")]
    pub root_directory: PathBuf,

    /// Artifact path for the full aggregated log.
    #[serde(default = "default_combined_output")]
    pub combined_output: PathBuf,

    /// Artifact path for the trailing-window log.
    #[serde(default = "default_filtered_output")]
    pub filtered_output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root_directory: default_root_directory(),
            combined_output: default_combined_output(),
            filtered_output: default_filtered_output(),
        }
    }
}

fn default_root_directory() -> PathBuf {
    PathBuf::from("work_logs")
}

fn default_combined_output() -> PathBuf {
    PathBuf::from("combined_work_logs.csv")
}

fn default_filtered_output() -> PathBuf {
    PathBuf::from("last_two_weeks_data.csv")
}

/// Text-generation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Base URL of the chat-completions API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API key. Can also come from the OPENAI_API_KEY env var.
    #[serde(default)]
    pub api_key: String,

    /// Optional organization header value.
    #[serde(default)]
    pub organization: String,

    /// Optional project header value.
    #[serde(default)]
    pub project: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            api_url: default_api_url(),
            api_key: String::new(),
            organization: String::new(),
            project: String::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout() -> u64 {
    120
}

/// Trailing-window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Window length in days; entries older than this are ignored.
    #[serde(default = "default_window_days")]
    pub days: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            days: default_window_days(),
        }
    }
}

fn default_window_days() -> u32 {
    14
}

/// Sending-schedule settings: one anchor date with its roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// First due date; every cycle is counted from here.
    #[serde(default = "default_anchor_date")]
    pub anchor_date: NaiveDate,

    /// Employees due for a summary on each cycle.
    #[serde(default = "default_roster")]
    pub roster: Vec<String>,

    /// Days between due dates.
    #[serde(default = "default_interval_days")]
    pub interval_days: u32,

    /// Total span of generated due dates, in days.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            anchor_date: default_anchor_date(),
            roster: default_roster(),
            interval_days: default_interval_days(),
            horizon_days: default_horizon_days(),
        }
    }
}

fn default_anchor_date() -> NaiveDate {
    // Matches the first scheduled send of the deployed roster.
    NaiveDate::from_ymd_opt(2024, 11, 30).expect("valid anchor date")
}

fn default_roster() -> Vec<String> {
    vec![
        "employee1".to_string(),
        "employee2".to_string(),
        "employee3".to_string(),
    ]
}

fn default_interval_days() -> u32 {
    14
}

fn default_horizon_days() -> u32 {
    365
}

/// Mail submission settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// SMTP relay host.
    #[serde(default = "default_relay")]
    pub relay: String,

    /// Submission port (implicit TLS).
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// Sender address; also the login user.
    #[serde(default)]
    pub from_email: String,

    /// Primary recipient address.
    #[serde(default)]
    pub to_email: String,

    /// Carbon-copy address; empty to skip.
    #[serde(default)]
    pub cc_email: String,

    /// Login password (for Gmail, an app password).
    #[serde(default)]
    pub password: String,

    /// Mail subject line.
    #[serde(default = "default_subject")]
    pub subject: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            relay: default_relay(),
            port: default_smtp_port(),
            from_email: String::new(),
            to_email: String::new(),
            cc_email: String::new(),
            password: String::new(),
            subject: default_subject(),
        }
    }
}

fn default_relay() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

fn default_subject() -> String {
    "Biweekly Work Summary".to_string()
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
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // Model settings - always override since they have defaults in CLI
        self.model.name = args.model.clone();
        self.model.api_url = args.api_url.clone();

        // Optional settings - only override if provided
        if let Some(ref api_key) = args.api_key {
            self.model.api_key = api_key.clone();
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }
        if let Some(ref root) = args.root {
            self.paths.root_directory = root.clone();
        }
        if let Some(days) = args.window_days {
            self.window.days = days;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.name, "gpt-4o-mini");
        assert_eq!(config.window.days, 14);
        assert_eq!(config.schedule.interval_days, 14);
        assert_eq!(config.schedule.horizon_days, 365);
        assert_eq!(config.smtp.port, 465);
        assert_eq!(
            config.schedule.anchor_date,
            NaiveDate::from_ymd_opt(2024, 11, 30).unwrap()
        );
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[paths]
root_directory = "/srv/logs"

[model]
name = "gpt-4o"
api_key = "sk-test"

[window]
days = 7

[schedule]
anchor_date = "2025-01-04"
roster = ["ada", "grace"]

[smtp]
to_email = "manager@example.com"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.paths.root_directory, PathBuf::from("/srv/logs"));
        assert_eq!(config.model.name, "gpt-4o");
        assert_eq!(config.model.api_key, "sk-test");
        assert_eq!(config.window.days, 7);
        assert_eq!(
            config.schedule.anchor_date,
            NaiveDate::from_ymd_opt(2025, 1, 4).unwrap()
        );
        assert_eq!(config.schedule.roster, vec!["ada", "grace"]);
        assert_eq!(config.smtp.to_email, "manager@example.com");
        // Untouched sections keep their defaults.
        assert_eq!(config.smtp.relay, "smtp.gmail.com");
        assert_eq!(config.schedule.interval_days, 14);
    }

    #[test]
    fn test_merge_with_args_overrides() {
        let args = crate::cli::Args {
            root: Some(PathBuf::from("/tmp/logs")),
            model: "gpt-4o".to_string(),
            api_url: "https://api.openai.com/v1".to_string(),
            api_key: Some("sk-cli".to_string()),
            config: None,
            window_days: Some(7),
            date: None,
            timeout: Some(30),
            verbose: false,
            quiet: false,
            dry_run: false,
            init_config: false,
        };

        let mut config = Config::default();
        config.model.api_key = "sk-file".to_string();
        config.merge_with_args(&args);

        assert_eq!(config.model.name, "gpt-4o");
        assert_eq!(config.model.api_key, "sk-cli");
        assert_eq!(config.model.timeout_seconds, 30);
        assert_eq!(config.paths.root_directory, PathBuf::from("/tmp/logs"));
        assert_eq!(config.window.days, 7);
        // Settings without a CLI counterpart are untouched.
        assert_eq!(config.schedule.interval_days, 14);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[paths]"));
        assert!(toml_str.contains("[model]"));
        assert!(toml_str.contains("[schedule]"));
        assert!(toml_str.contains("[smtp]"));
        // Round-trips through the parser.
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.window.days, 14);
    }
}

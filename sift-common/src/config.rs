//! Configuration types and loading for the Sift screener.
//!
//! Configuration is read once at startup from a JSON file, then overlaid
//! with environment variables so the binary can run from a bare crontab
//! entry without any file on disk.
//!
//! ## Environment overrides
//!
//! - `OUTPUT_DIR` → output_dir
//! - `TO_EMAIL` → delivery.recipient
//! - `BREVO_API_KEY` → delivery.api.api_key
//! - `SENDER_EMAIL` → delivery.api.sender_email
//! - `SENDER_NAME` → delivery.api.sender_name
//! - `SMTP_HOST` / `SMTP_PORT` / `SMTP_USER` / `SMTP_PASSWORD` → delivery.smtp.*
//! - `SIFT_LOG_LEVEL` / `SIFT_LOG_FORMAT` → observability.*
//! - `SIFT_CONFIG` → alternate config file path

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".sift"),
        |dirs| dirs.home_dir().join(".sift"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Universe
// ============================================================================

/// One screening pair: a security and the commodity proxy it is measured
/// against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniverseEntry {
    /// Security symbol (e.g. "VNOM")
    pub ticker: String,
    /// Commodity futures proxy symbol (e.g. "CL=F")
    pub proxy: String,
}

impl UniverseEntry {
    /// Convenience constructor for static universe tables.
    pub fn new(ticker: impl Into<String>, proxy: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            proxy: proxy.into(),
        }
    }
}

/// Built-in royalty universe: oil & gas names against WTI crude, precious
/// metal streamers against gold.
fn default_universe() -> Vec<UniverseEntry> {
    vec![
        UniverseEntry::new("DMLP", "CL=F"),
        UniverseEntry::new("BSM", "CL=F"),
        UniverseEntry::new("KRP", "CL=F"),
        UniverseEntry::new("VNOM", "CL=F"),
        UniverseEntry::new("TPL", "CL=F"),
        UniverseEntry::new("FNV", "GC=F"),
        UniverseEntry::new("WPM", "GC=F"),
        UniverseEntry::new("RGLD", "GC=F"),
        UniverseEntry::new("SAND", "GC=F"),
    ]
}

// ============================================================================
// Delivery Configuration
// ============================================================================

/// Credentials for the transactional email API channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API key sent in the `api-key` header
    #[serde(default)]
    pub api_key: String,
    /// Sender address registered with the API provider
    #[serde(default)]
    pub sender_email: String,
    /// Display name for the sender
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    /// API base URL (override for testing)
    #[serde(default = "default_api_endpoint")]
    pub endpoint: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            sender_email: String::new(),
            sender_name: default_sender_name(),
            endpoint: default_api_endpoint(),
        }
    }
}

impl ApiConfig {
    /// The channel is usable only when both key and sender are present.
    pub fn is_complete(&self) -> bool {
        !self.api_key.is_empty() && !self.sender_email.is_empty()
    }
}

fn default_sender_name() -> String {
    "Sift Screener".to_string()
}

fn default_api_endpoint() -> String {
    "https://api.brevo.com".to_string()
}

/// Credentials for the SMTP channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// SMTP server hostname
    #[serde(default)]
    pub host: String,
    /// SMTP server port; 465 selects implicit TLS, anything else STARTTLS
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Username for authentication, also used as the from address
    #[serde(default)]
    pub username: String,
    /// Password for authentication
    #[serde(default)]
    pub password: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
        }
    }
}

impl SmtpConfig {
    /// The channel is usable only when host and credentials are present.
    pub fn is_complete(&self) -> bool {
        !self.host.is_empty() && !self.username.is_empty() && !self.password.is_empty()
    }
}

fn default_smtp_port() -> u16 {
    465
}

/// Delivery configuration, resolved once at startup and read-only for the
/// lifetime of the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Report recipient address; without it no channel is configured
    #[serde(default)]
    pub recipient: Option<String>,
    /// Email API credentials (first-priority channel)
    #[serde(default)]
    pub api: Option<ApiConfig>,
    /// SMTP credentials (fallback channel)
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

// ============================================================================
// Main Configuration
// ============================================================================

/// Top-level screener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory the report artifact is written to
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Lookback period for price history (Yahoo range syntax, e.g. "1y")
    #[serde(default = "default_period")]
    pub period: String,

    /// Minimum number of aligned return observations per pair
    #[serde(default = "default_min_observations")]
    pub min_observations: usize,

    /// Securities to screen, in report order
    #[serde(default = "default_universe")]
    pub universe: Vec<UniverseEntry>,

    /// Delivery channel credentials
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Logging configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            period: default_period(),
            min_observations: default_min_observations(),
            universe: default_universe(),
            delivery: DeliveryConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_period() -> String {
    "1y".to_string()
}

fn default_min_observations() -> usize {
    60
}

impl Config {
    /// Load configuration from the default path, falling back to defaults
    /// when no file exists.
    pub fn load() -> Result<Self> {
        let path = match std::env::var("SIFT_CONFIG") {
            Ok(p) => PathBuf::from(p),
            Err(_) => config_path(),
        };
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration with environment variable fallbacks.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("OUTPUT_DIR") {
            self.output_dir = dir;
        }

        if let Ok(to) = std::env::var("TO_EMAIL") {
            self.delivery.recipient = Some(to);
        }

        // API channel credentials
        if let Ok(key) = std::env::var("BREVO_API_KEY") {
            self.delivery.api.get_or_insert_with(ApiConfig::default).api_key = key;
        }
        if let Ok(sender) = std::env::var("SENDER_EMAIL") {
            self.delivery.api.get_or_insert_with(ApiConfig::default).sender_email = sender;
        }
        if let Ok(name) = std::env::var("SENDER_NAME") {
            self.delivery.api.get_or_insert_with(ApiConfig::default).sender_name = name;
        }

        // SMTP channel credentials
        if let Ok(host) = std::env::var("SMTP_HOST") {
            self.delivery.smtp.get_or_insert_with(SmtpConfig::default).host = host;
        }
        if let Ok(port) = std::env::var("SMTP_PORT") {
            if let Ok(p) = port.parse() {
                self.delivery.smtp.get_or_insert_with(SmtpConfig::default).port = p;
            }
        }
        if let Ok(user) = std::env::var("SMTP_USER") {
            self.delivery.smtp.get_or_insert_with(SmtpConfig::default).username = user;
        }
        if let Ok(pwd) = std::env::var("SMTP_PASSWORD") {
            self.delivery.smtp.get_or_insert_with(SmtpConfig::default).password = pwd;
        }

        if let Ok(level) = std::env::var("SIFT_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Ok(format) = std::env::var("SIFT_LOG_FORMAT") {
            self.observability.log_format = format;
        }
    }

    /// Output directory with `~` expanded.
    pub fn expanded_output_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.output_dir).into_owned())
    }
}

// ============================================================================
// Tests
// ============================================================================

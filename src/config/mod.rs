// src/config/mod.rs - Kiosk host configuration
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure, loaded from a TOML file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub kiosk: KioskConfig,

    #[serde(default)]
    pub intake: IntakeConfig,

    #[serde(default)]
    pub printer: PrinterConfig,

    #[serde(default)]
    pub spooler: SpoolerConfig,

    #[serde(default)]
    pub preview: PreviewConfig,
}

/// Kiosk-level settings (the QR target and screen timing).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KioskConfig {
    /// URL encoded into the welcome-screen QR code; points at the upload web page.
    #[serde(default = "default_qr_url")]
    pub qr_url: String,

    /// Seconds the success screen stays up before returning to welcome.
    #[serde(default = "default_success_countdown")]
    pub success_countdown_secs: u64,
}

/// File intake HTTP listener settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IntakeConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_intake_port")]
    pub port: u16,

    /// Scratch directory for uploaded files. When unset a temporary directory
    /// is created and removed on exit.
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

/// Target printer settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PrinterConfig {
    /// Printer name as configured in the spooler.
    #[serde(default = "default_printer_name")]
    pub name: String,
}

/// Job status polling settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpoolerConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Cap for the exponential poll backoff.
    #[serde(default = "default_poll_max_interval_ms")]
    pub poll_max_interval_ms: u64,

    /// Maximum total wait for a job to reach a terminal state.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

/// Page preview rendering settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PreviewConfig {
    #[serde(default = "default_preview_dpi")]
    pub dpi: u32,
}

// Default value functions
fn default_qr_url() -> String { "https://printervendingmachine.onrender.com/".to_string() }
fn default_success_countdown() -> u64 { 5 }
fn default_bind_address() -> String { "0.0.0.0".to_string() }
fn default_intake_port() -> u16 { 5001 }
fn default_printer_name() -> String { "HP_LaserJet_M208dw".to_string() }
fn default_poll_interval_ms() -> u64 { 1000 }
fn default_poll_max_interval_ms() -> u64 { 5000 }
fn default_poll_timeout_secs() -> u64 { 900 }
fn default_preview_dpi() -> u32 { 150 }

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            qr_url: default_qr_url(),
            success_countdown_secs: default_success_countdown(),
        }
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_intake_port(),
            scratch_dir: None,
        }
    }
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self { name: default_printer_name() }
    }
}

impl Default for SpoolerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            poll_max_interval_ms: default_poll_max_interval_ms(),
            poll_timeout_secs: default_poll_timeout_secs(),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { dpi: default_preview_dpi() }
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&contents)?;
    config.validate()?;
    tracing::info!("Loaded configuration from: {}", config_path);
    Ok(config)
}

impl Config {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.printer.name.is_empty() {
            return Err(ConfigError::Invalid("printer name must be specified".into()));
        }

        if self.intake.port == 0 {
            return Err(ConfigError::Invalid("intake port must be non-zero".into()));
        }

        if self.spooler.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be positive".into()));
        }

        if self.spooler.poll_max_interval_ms < self.spooler.poll_interval_ms {
            return Err(ConfigError::Invalid(
                "poll_max_interval_ms must be at least poll_interval_ms".into(),
            ));
        }

        if self.preview.dpi == 0 {
            return Err(ConfigError::Invalid("preview dpi must be positive".into()));
        }

        Ok(())
    }
}

//! Configuration file support.
//!
//! A JSON settings file with the defaults callers want for apply operations
//! and the verbosity of the per-operation logger.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::apply::ApplyOptions;
use crate::error::Result;
use crate::logging::OpLogger;

/// Log level setting for headerlet operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Log nothing
    #[default]
    Off,
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Off => "Off",
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Settings for headerlet operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderletConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Archive the destination's current WCS before applying
    #[serde(default = "default_true")]
    pub make_rollback: bool,

    /// Attach the applied headerlet to the destination
    #[serde(default = "default_true")]
    pub attach: bool,

    /// Record applied solutions in the correction-history ledger
    #[serde(default = "default_true")]
    pub update_ledger: bool,

    /// Compress archived headerlets
    #[serde(default)]
    pub compress_attachments: bool,
}

fn default_true() -> bool {
    true
}

impl Default for HeaderletConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            log_level: LogLevel::default(),
            make_rollback: true,
            attach: true,
            update_ledger: true,
            compress_attachments: false,
        }
    }
}

impl HeaderletConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        if config.version != CONFIG_VERSION {
            config.logger().warn(format_args!(
                "Config version {} differs from supported version {}",
                config.version,
                CONFIG_VERSION
            ));
        }
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        config.logger().debug(format_args!(
            "Loaded headerlet config from {:?} (log level {})",
            path,
            config.log_level.name()
        ));
        Ok(config)
    }

    /// Save this configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Logger handle at the configured level.
    pub fn logger(&self) -> OpLogger {
        OpLogger::new(self.log_level.to_level_filter())
    }

    /// Apply options seeded from this configuration.
    pub fn apply_options(&self) -> ApplyOptions {
        ApplyOptions::new()
            .make_rollback(self.make_rollback)
            .attach(self.attach)
            .update_ledger(self.update_ledger)
            .compress(self.compress_attachments)
    }
}

//! Per-operation logging handle.
//!
//! Operations never touch global logger state. Each call receives an
//! [`OpLogger`] whose level filter is chosen by the caller; messages above
//! that level are dropped here, the rest go to the `log` facade under the
//! handle's target.

use std::fmt;

use log::{Level, LevelFilter};

/// Default log target for headerlet operations.
pub const DEFAULT_TARGET: &str = "headerlet";

/// Logging handle threaded through headerlet operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpLogger {
    target: &'static str,
    level: LevelFilter,
}

impl OpLogger {
    /// Create a handle logging up to `level`.
    pub fn new(level: LevelFilter) -> Self {
        Self {
            target: DEFAULT_TARGET,
            level,
        }
    }

    /// A handle that discards everything.
    pub fn disabled() -> Self {
        Self::new(LevelFilter::Off)
    }

    /// Same level, different target.
    pub fn with_target(mut self, target: &'static str) -> Self {
        self.target = target;
        self
    }

    /// The configured level filter.
    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// The log target.
    pub fn target(&self) -> &'static str {
        self.target
    }

    /// Whether messages at `level` pass this handle.
    pub fn enabled(&self, level: Level) -> bool {
        level <= self.level
    }

    /// Forward a message if its level is enabled.
    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if self.enabled(level) {
            log::log!(target: self.target, level, "{}", args);
        }
    }

    /// Log at error level.
    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }

    /// Log at warn level.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    /// Log at info level.
    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    /// Log at debug level.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }
}

impl Default for OpLogger {
    fn default() -> Self {
        Self::disabled()
    }
}

//! Core configuration types.
//! - Config holds runtime settings with sensible defaults.
//! - LogLevel represents verbosity with simple parsing helpers.
//! - ConfirmMode selects when the user is asked before an item is moved.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::paths;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// When to ask the user before moving an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmMode {
    /// Ask for every item (`-i`).
    Always,
    /// Never ask (`-f`).
    Never,
    /// Ask only for items the process cannot write to.
    #[default]
    WriteProtected,
}

impl ConfirmMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" | "interactive" => Some(ConfirmMode::Always),
            "never" | "force" => Some(ConfirmMode::Never),
            "write-protected" | "write_protected" | "protected" => {
                Some(ConfirmMode::WriteProtected)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ConfirmMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfirmMode::Always => "always",
            ConfirmMode::Never => "never",
            ConfirmMode::WriteProtected => "write-protected",
        })
    }
}

impl FromStr for ConfirmMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid confirm mode: '{s}'"))
    }
}

/// Runtime configuration used by the remover.
#[derive(Debug, Clone)]
pub struct Config {
    /// Basket root; `files/` and `info/` live underneath
    pub basket: PathBuf,
    /// When to prompt before moving an item
    pub confirm: ConfirmMode,
    /// Glob patterns matched against base names; empty means everything is relevant
    pub patterns: Vec<String>,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// If true, log the plan but do not modify the filesystem
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            basket: paths::default_basket_path(),
            confirm: ConfirmMode::default(),
            patterns: Vec::new(),
            log_level: LogLevel::Normal,
            log_file: None,
            dry_run: false,
        }
    }
}

impl Config {
    /// Construct a Config with an explicit basket; other fields use defaults.
    pub fn new(basket: impl Into<PathBuf>) -> Self {
        Self {
            basket: basket.into(),
            ..Default::default()
        }
    }

    pub fn with_confirm(mut self, confirm: ConfirmMode) -> Self {
        self.confirm = confirm;
        self
    }
}

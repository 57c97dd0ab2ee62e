//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - `-r` wins over `-d` when both are given.
//! - `-f` and `-i` are mutually exclusive; without either, only write-protected
//!   items are confirmed.
//! - --debug is a shorthand for --log-level debug.

use clap::{ArgAction, Parser, ValueHint};
use std::path::PathBuf;

use crate::config::types::{Config, ConfirmMode, LogLevel};
use crate::remover::RemoveMode;

/// Move files and directories into a basket instead of deleting them.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Move files and directories to a restorable basket instead of deleting them"
)]
pub struct Args {
    /// Paths to remove.
    #[arg(
        value_name = "PATH",
        value_hint = ValueHint::AnyPath,
        required_unless_present = "print_config"
    )]
    pub paths: Vec<PathBuf>,

    /// Remove empty directories.
    #[arg(short = 'd', long = "dir", help = "Remove empty directories")]
    pub dir: bool,

    /// Remove directories and their contents, bottom-up.
    #[arg(
        short = 'r',
        short_alias = 'R',
        long,
        help = "Remove directories and their contents recursively"
    )]
    pub recursive: bool,

    /// Prompt before every removal.
    #[arg(short = 'i', long, conflicts_with = "force", help = "Prompt before every removal")]
    pub interactive: bool,

    /// Never prompt.
    #[arg(short = 'f', long, help = "Never prompt")]
    pub force: bool,

    /// Only remove items whose name matches one of these globs (repeatable).
    #[arg(
        long = "pattern",
        value_name = "GLOB",
        action = ArgAction::Append,
        help = "Only remove items whose base name matches GLOB (repeatable)"
    )]
    pub patterns: Vec<String>,

    /// Override the basket directory (normally configured via XML).
    #[arg(long, value_hint = ValueHint::DirPath, help = "Override the basket directory")]
    pub basket: Option<PathBuf>,

    /// Dry-run: log what would be moved but do not modify the filesystem.
    #[arg(long, help = "Show what would be moved, but do not modify anything")]
    pub dry_run: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'v',
        long,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Emit logs in structured JSON.
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,

    /// Print where smart_rm will look for the config file, then exit.
    #[arg(long, help = "Print the config file location used by smart_rm and exit")]
    pub print_config: bool,
}

impl Args {
    pub fn mode(&self) -> RemoveMode {
        if self.recursive {
            RemoveMode::Trees
        } else if self.dir {
            RemoveMode::Directories
        } else {
            RemoveMode::Files
        }
    }

    /// Confirmation mode requested on the command line, if any.
    pub fn confirm_mode(&self) -> Option<ConfirmMode> {
        if self.force {
            Some(ConfirmMode::Never)
        } else if self.interactive {
            Some(ConfirmMode::Always)
        } else {
            None
        }
    }

    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(b) = &self.basket {
            cfg.basket = b.clone();
        }
        if let Some(mode) = self.confirm_mode() {
            cfg.confirm = mode;
        }
        if !self.patterns.is_empty() {
            cfg.patterns = self.patterns.clone();
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if self.dry_run {
            cfg.dry_run = true;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}

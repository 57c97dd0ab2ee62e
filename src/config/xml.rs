//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - A missing file means "use defaults"; a malformed one is an error.
//!
//! Notes:
//! - This module only reads the config file; the basket itself is created by `Basket::ensure`.
//! - Unknown XML fields are rejected to surface misconfigurations early.

use anyhow::{Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use super::paths::{default_config_path, expand_tilde};
use crate::config::types::{Config, ConfirmMode, LogLevel};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    #[serde(rename = "basket")]
    basket: Option<String>,
    #[serde(rename = "confirm")]
    confirm: Option<String>,
    /// Repeated `<pattern>` elements
    #[serde(rename = "pattern", default)]
    patterns: Vec<String>,
    #[serde(rename = "log_level")]
    log_level: Option<String>,
    #[serde(rename = "log_file")]
    log_file: Option<String>,
    #[serde(rename = "dry_run")]
    dry_run: Option<bool>,
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

// Map XmlConfig -> Config, falling back to defaults field by field.
fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(b) = parsed.basket.as_deref().and_then(non_empty) {
        cfg.basket = expand_tilde(b);
    }
    if let Some(c) = parsed.confirm.as_deref().and_then(non_empty) {
        cfg.confirm = c.parse::<ConfirmMode>().map_err(anyhow::Error::msg)?;
    }
    cfg.patterns = parsed
        .patterns
        .iter()
        .filter_map(|p| non_empty(p))
        .map(str::to_string)
        .collect();
    if let Some(s) = parsed.log_level.as_deref().and_then(non_empty) {
        cfg.log_level = s.parse::<LogLevel>().map_err(anyhow::Error::msg)?;
    }
    cfg.log_file = parsed.log_file.as_deref().and_then(non_empty).map(expand_tilde);
    cfg.dry_run = parsed.dry_run.unwrap_or(false);

    Ok(cfg)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    xml_to_config(parsed).with_context(|| format!("config xml '{}'", path.display()))
}

/// Load the effective Config: $SMART_RM_CONFIG or the default location.
/// Returns defaults when no file exists there.
pub fn load_config() -> Result<Config> {
    let Some(path) = default_config_path() else {
        debug!("no config location available; using defaults");
        return Ok(Config::default());
    };
    if !path.exists() {
        debug!(path = %path.display(), "config file not found; using defaults");
        return Ok(Config::default());
    }
    debug!(path = %path.display(), "loading config");
    load_config_from_xml_path(&path)
}

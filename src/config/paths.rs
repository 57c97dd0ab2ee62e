//! Default path helpers and symlink checks.
//! Determines OS-appropriate config/basket/log paths and detects symlinked ancestors for safety.

use dirs::{config_dir, data_dir, home_dir};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable that points at an explicit config file.
pub const CONFIG_ENV: &str = "SMART_RM_CONFIG";

/// Config file location: $SMART_RM_CONFIG if set, else the OS config dir.
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(p));
    }
    if let Some(mut base) = config_dir() {
        base.push("smart_rm");
        base.push("config.xml");
        Some(base)
    } else {
        env::var("HOME").ok().map(|h| {
            PathBuf::from(h)
                .join(".config")
                .join("smart_rm")
                .join("config.xml")
        })
    }
}

/// Default basket root under the user's data dir.
pub fn default_basket_path() -> PathBuf {
    if let Some(mut base) = data_dir() {
        base.push("smart_rm");
        base.push("basket");
        base
    } else {
        env::var("HOME")
            .map(|h| PathBuf::from(h).join(".local").join("share").join("basket"))
            .unwrap_or_else(|_| PathBuf::from(".smart_rm").join("basket"))
    }
}

/// OS-appropriate default log file path (data dir).
pub fn default_log_path() -> Option<PathBuf> {
    data_dir().map(|mut base| {
        base.push("smart_rm");
        base.push("smart_rm.log");
        base
    })
}

/// Expand a leading `~` or `~/` to the home directory. Other forms
/// (`~user`) and paths without a home directory are returned unchanged.
pub fn expand_tilde(raw: &str) -> PathBuf {
    let rest = match raw.strip_prefix('~') {
        Some("") => "",
        Some(rest) => match rest.strip_prefix('/') {
            Some(rest) => rest,
            None => return PathBuf::from(raw),
        },
        None => return PathBuf::from(raw),
    };
    match home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(raw),
    }
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.exists() {
            let meta = fs::symlink_metadata(anc)?;
            if meta.file_type().is_symlink() {
                return Ok(true);
            }
        }
        p = anc.parent();
    }
    Ok(false)
}

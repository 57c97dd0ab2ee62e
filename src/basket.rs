//! Basket layout: `<root>/files` holds moved entries, `<root>/info` holds
//! one `<entry>.trashinfo` record per moved entry.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::{Result, SmartRmError};
use crate::fs_ops::resolve_existing_prefix;
use crate::platform::set_dir_mode_0700;

pub const FILES_DIR: &str = "files";
pub const INFO_DIR: &str = "info";
pub const INFO_FILE_EXTENSION: &str = ".trashinfo";

#[derive(Debug, Clone)]
pub struct Basket {
    root: PathBuf,
    files_dir: PathBuf,
    info_dir: PathBuf,
}

impl Basket {
    /// The root is resolved (`..`, symlinked ancestors) once here; walk
    /// exclusion and the inside-basket guard compare against this form.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = resolve_existing_prefix(&root.into());
        Self {
            files_dir: root.join(FILES_DIR),
            info_dir: root.join(INFO_DIR),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files_dir(&self) -> &Path {
        &self.files_dir
    }

    pub fn info_dir(&self) -> &Path {
        &self.info_dir
    }

    /// Sidecar record path for a basket entry name.
    pub fn info_path_for(&self, entry_name: &std::ffi::OsStr) -> PathBuf {
        let mut name = entry_name.to_os_string();
        name.push(INFO_FILE_EXTENSION);
        self.info_dir.join(name)
    }

    /// Create both subdirectories if missing (0700 on Unix when newly created).
    pub fn ensure(&self) -> Result<()> {
        for dir in [&self.root, &self.files_dir, &self.info_dir] {
            if dir.is_dir() {
                continue;
            }
            if dir.exists() {
                return Err(SmartRmError::Config(format!(
                    "basket path exists but is not a directory: {}",
                    dir.display()
                )));
            }
            fs::create_dir_all(dir).map_err(SmartRmError::io_with("create basket directory", dir))?;
            let _ = set_dir_mode_0700(dir);
            info!(path = %dir.display(), "Created basket directory");
        }
        Ok(())
    }
}

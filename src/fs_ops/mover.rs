//! Single-item mover.
//! Moves one file, symlink or empty directory into the basket's `files/`
//! directory. Tries an atomic rename first; across filesystems it copies
//! (or re-creates) the entry and then removes the source, undoing the copy
//! if the source cannot be removed.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::errors::{Result, SmartRmError};
use crate::planner::{CandidatePath, EntryKind};
use crate::platform::tmp_sibling_name;

use super::atomic::try_atomic_move;
use super::duplicate::resolve_entry_name;
use super::util::is_cross_device;

/// Where a moved item ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovedItem {
    pub original: PathBuf,
    pub entry_name: OsString,
    pub dest: PathBuf,
    pub kind: EntryKind,
}

pub trait ItemMover {
    /// Move `item` into `files_dir`. On error the source is left in place.
    fn move_item(&self, item: &CandidatePath, files_dir: &Path) -> Result<MovedItem>;
}

/// Mover for the on-disk basket. Names are checked against both `files/`
/// and the sibling `info/` so an entry never inherits someone else's record.
#[derive(Debug, Clone)]
pub struct BasketMover {
    info_dir: PathBuf,
}

impl BasketMover {
    pub fn new(info_dir: impl Into<PathBuf>) -> Self {
        Self {
            info_dir: info_dir.into(),
        }
    }
}

impl ItemMover for BasketMover {
    fn move_item(&self, item: &CandidatePath, files_dir: &Path) -> Result<MovedItem> {
        let src = item.path.as_path();
        if item.kind.is_dir() {
            ensure_empty_dir(src)?;
        }

        let name = src.file_name().ok_or_else(|| SmartRmError::WrongKind {
            path: src.to_path_buf(),
            expected: "a path with a final component",
        })?;
        let entry_name = resolve_entry_name(files_dir, &self.info_dir, name);
        let dest = files_dir.join(&entry_name);

        match try_atomic_move(src, &dest) {
            Ok(()) => {
                info!(src = %src.display(), dest = %dest.display(), "Moved to basket");
            }
            Err(e) if is_cross_device(&e) => {
                debug!(src = %src.display(), "cross-filesystem move; copying instead");
                move_across_devices(src, &dest, item.kind)?;
                info!(src = %src.display(), dest = %dest.display(), "Copied to basket and removed source");
            }
            Err(e) => return Err(SmartRmError::from_io("move to basket", src, e)),
        }

        Ok(MovedItem {
            original: src.to_path_buf(),
            entry_name,
            dest,
            kind: item.kind,
        })
    }
}

/// Re-validate what the planner promised: directories reach the mover empty.
fn ensure_empty_dir(dir: &Path) -> Result<()> {
    let mut entries = fs::read_dir(dir).map_err(SmartRmError::io_with("list directory", dir))?;
    if entries.next().is_some() {
        return Err(SmartRmError::NotEmpty(dir.to_path_buf()));
    }
    Ok(())
}

fn move_across_devices(src: &Path, dest: &Path, kind: EntryKind) -> Result<()> {
    match kind {
        EntryKind::File => {
            let tmp = tmp_sibling_name(dest);
            if let Err(e) = copy_synced(src, &tmp).and_then(|_| try_atomic_move(&tmp, dest)) {
                let _ = fs::remove_file(&tmp);
                return Err(SmartRmError::from_io("copy to basket", src, e));
            }
            fs::remove_file(src).map_err(|e| {
                undo(dest, kind);
                SmartRmError::from_io("remove original file", src, e)
            })
        }
        EntryKind::Directory => {
            fs::create_dir(dest).map_err(SmartRmError::io_with("create basket directory", dest))?;
            fs::remove_dir(src).map_err(|e| {
                undo(dest, kind);
                SmartRmError::from_io("remove original directory", src, e)
            })
        }
        EntryKind::Symlink => {
            let target = fs::read_link(src).map_err(SmartRmError::io_with("read link", src))?;
            make_symlink(&target, dest).map_err(SmartRmError::io_with("create link", dest))?;
            fs::remove_file(src).map_err(|e| {
                undo(dest, kind);
                SmartRmError::from_io("remove original link", src, e)
            })
        }
    }
}

fn copy_synced(src: &Path, dst: &Path) -> io::Result<()> {
    fs::copy(src, dst)?;
    fs::File::open(dst)?.sync_all()
}

#[cfg(unix)]
fn make_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn make_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

/// Remove a copy whose source could not be removed, so nothing ends up duplicated.
fn undo(dest: &Path, kind: EntryKind) {
    let res = if kind.is_dir() {
        fs::remove_dir(dest)
    } else {
        fs::remove_file(dest)
    };
    if let Err(e) = res {
        warn!(dest = %dest.display(), error = %e, "could not undo partial basket copy");
    }
}

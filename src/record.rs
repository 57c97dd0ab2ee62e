//! Restoration records (`info/<entry>.trashinfo`).
//!
//! Format, one key per line:
//! ```text
//! [Trash Info]
//! Path=/abs/original/path%20with%20spaces
//! DeletionDate=2026-10-19T12:00:00
//! Hash=<sha256, lowercase hex>
//! ```
//!
//! `Path` is percent-encoded per segment over the raw path bytes, so names
//! holding newlines or non-UTF-8 bytes survive and cannot add keys.
//!
//! Fingerprint scheme: a regular file is hashed over its bytes, read from the
//! basket entry (the original path no longer exists once moved). Directories
//! and symlinks are hashed over the original absolute path.

use chrono::{Local, NaiveDateTime};
use sha2::{Digest, Sha256};
use std::ffi::OsStr;
use std::fmt::Write as _;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::basket::Basket;
use crate::fs_ops::{MovedItem, describe_io_error};
use crate::planner::EntryKind;
use crate::platform::atomic_write_0600;

pub const INFO_SECTION: &str = "[Trash Info]";
pub const PATH_KEY: &str = "Path";
pub const DATE_KEY: &str = "DeletionDate";
pub const HASH_KEY: &str = "Hash";
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashRecord {
    pub original_path: PathBuf,
    pub removed_at: NaiveDateTime,
    pub fingerprint: String,
}

impl TrashRecord {
    pub fn to_ini(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{INFO_SECTION}");
        let _ = writeln!(out, "{PATH_KEY}={}", encode_path(&self.original_path));
        let _ = writeln!(out, "{DATE_KEY}={}", self.removed_at.format(DATE_FORMAT));
        let _ = writeln!(out, "{HASH_KEY}={}", self.fingerprint);
        out
    }

    /// Parse a record. Unknown keys are ignored; all three known keys are required.
    pub fn parse(text: &str) -> Option<Self> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        if lines.next()? != INFO_SECTION {
            return None;
        }
        let (mut path, mut date, mut hash) = (None, None, None);
        for line in lines {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            match key.trim() {
                PATH_KEY => path = Some(decode_path(value.trim())),
                DATE_KEY => date = NaiveDateTime::parse_from_str(value.trim(), DATE_FORMAT).ok(),
                HASH_KEY => hash = Some(value.trim().to_string()),
                _ => {}
            }
        }
        Some(Self {
            original_path: path?,
            removed_at: date?,
            fingerprint: hash?,
        })
    }
}

/// Result of writing a record. An orphaned entry is a warning, never an error:
/// the move already happened and is not rolled back.
#[derive(Debug)]
pub enum RecordStatus {
    Written(PathBuf),
    Orphaned { entry: PathBuf, reason: String },
}

impl RecordStatus {
    pub fn is_written(&self) -> bool {
        matches!(self, RecordStatus::Written(_))
    }
}

#[derive(Debug, Clone)]
pub struct TrashRecordWriter {
    basket: Basket,
}

impl TrashRecordWriter {
    pub fn new(basket: Basket) -> Self {
        Self { basket }
    }

    /// Write the record for an item that has just been moved.
    pub fn record(&self, moved: &MovedItem) -> RecordStatus {
        self.record_at(moved, Local::now().naive_local())
    }

    pub fn record_at(&self, moved: &MovedItem, removed_at: NaiveDateTime) -> RecordStatus {
        let info_path = self.basket.info_path_for(&moved.entry_name);

        let fingerprint = match fingerprint(moved) {
            Ok(f) => f,
            Err(e) => return self.orphaned(moved, describe_io_error("hash", &moved.dest, &e)),
        };
        let record = TrashRecord {
            original_path: moved.original.clone(),
            removed_at,
            fingerprint,
        };

        match atomic_write_0600(&info_path, record.to_ini().as_bytes()) {
            Ok(()) => {
                debug!(info = %info_path.display(), "Wrote trash record");
                RecordStatus::Written(info_path)
            }
            Err(e) => self.orphaned(moved, format!("{e:#}")),
        }
    }

    fn orphaned(&self, moved: &MovedItem, reason: String) -> RecordStatus {
        warn!(
            entry = %moved.dest.display(),
            original = %moved.original.display(),
            %reason,
            "basket entry has no trash record"
        );
        RecordStatus::Orphaned {
            entry: moved.dest.clone(),
            reason,
        }
    }
}

fn fingerprint(moved: &MovedItem) -> io::Result<String> {
    match moved.kind {
        EntryKind::File => hash_file(&moved.dest),
        EntryKind::Directory | EntryKind::Symlink => Ok(hash_path(&moved.original)),
    }
}

pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut file = File::open(path)?;
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

pub fn hash_path(path: &Path) -> String {
    format!("{:x}", Sha256::digest(os_bytes(path.as_os_str())))
}

fn encode_path(path: &Path) -> String {
    os_bytes(path.as_os_str())
        .split(|b| *b == b'/')
        .map(|segment| urlencoding::encode_binary(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn decode_path(value: &str) -> PathBuf {
    path_from_bytes(urlencoding::decode_binary(value.as_bytes()).into_owned())
}

#[cfg(unix)]
fn os_bytes(s: &OsStr) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    s.as_bytes().to_vec()
}

#[cfg(not(unix))]
fn os_bytes(s: &OsStr) -> Vec<u8> {
    s.to_string_lossy().into_owned().into_bytes()
}

#[cfg(unix)]
fn path_from_bytes(bytes: Vec<u8>) -> PathBuf {
    use std::os::unix::ffi::OsStringExt;
    PathBuf::from(std::ffi::OsString::from_vec(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: Vec<u8>) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(&bytes).into_owned())
}

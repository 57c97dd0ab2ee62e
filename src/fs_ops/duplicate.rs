//! Basket entry naming.
//!
//! An entry keeps its original base name unless that name is already taken
//! in `files/` or already has a record in `info/`; then " (n)" is inserted
//! before the extension, n = 2, 3, ... until both are free.
//!
//! Notes:
//! - This only decides the name based on current filesystem state. Concurrent
//!   smart_rm processes sharing a basket may still race.

use std::ffi::{OsStr, OsString};
use std::path::Path;
use tracing::trace;

use crate::basket::INFO_FILE_EXTENSION;

const MAX_TRIES: u64 = 10_000;

/// Choose a basket entry name for `name` that collides with neither an
/// existing entry in `files_dir` nor an existing record in `info_dir`.
///
/// Examples:
/// - "movie.mkv" -> "movie (2).mkv", "movie (3).mkv", ...
/// - ".env" -> ".env (2)"
/// - "archive.tar.gz" -> "archive.tar (2).gz"
pub fn resolve_entry_name(files_dir: &Path, info_dir: &Path, name: &OsStr) -> OsString {
    let base = Path::new(name);
    let stem: OsString = base
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from(name));
    let ext: Option<OsString> = base.extension().map(|e| e.to_os_string());

    let first = build_name_with_suffix(&stem, ext.as_deref(), "");
    if is_free(files_dir, info_dir, &first) {
        return first;
    }

    let mut collisions = 0u32;
    for n in 2..=MAX_TRIES {
        let candidate = build_name_with_suffix(&stem, ext.as_deref(), &format!(" ({n})"));
        if is_free(files_dir, info_dir, &candidate) {
            return candidate;
        }
        collisions = collisions.saturating_add(1);
        if collisions == 3 {
            trace!(name = ?name, dir = %files_dir.display(), "basket name: multiple collisions, continuing to search unique suffix");
        }
    }
    // Final fallback if the basket is extremely crowded with numbered variants.
    build_name_with_suffix(&stem, ext.as_deref(), " (final)")
}

fn is_free(files_dir: &Path, info_dir: &Path, name: &OsStr) -> bool {
    let mut info_name = name.to_os_string();
    info_name.push(INFO_FILE_EXTENSION);
    // symlink_metadata so dangling links in the basket still count as taken
    files_dir.join(name).symlink_metadata().is_err()
        && info_dir.join(info_name).symlink_metadata().is_err()
}

// Conservative filename limits, leaving room for the ".trashinfo" record suffix.
#[cfg(windows)]
const MAX_FILENAME_LEN: usize = 240 - INFO_FILE_EXTENSION.len();
#[cfg(not(windows))]
const MAX_FILENAME_LEN: usize = 255 - INFO_FILE_EXTENSION.len();

/// Measure the approximate length of an OsStr for filename budgeting.
#[cfg(unix)]
fn name_len_units(s: &OsStr) -> usize {
    use std::os::unix::ffi::OsStrExt;
    s.as_bytes().len()
}

#[cfg(not(unix))]
fn name_len_units(s: &OsStr) -> usize {
    s.to_string_lossy().len()
}

/// Truncate the stem if needed so `stem + suffix + ["." + ext]` fits within MAX_FILENAME_LEN.
fn build_name_with_suffix(stem: &OsStr, ext: Option<&OsStr>, suffix: &str) -> OsString {
    let mut overhead = name_len_units(OsStr::new(suffix));
    let mut ext_part = OsString::new();
    if let Some(e) = ext {
        overhead = overhead.saturating_add(1 + name_len_units(e));
        ext_part.push(".");
        ext_part.push(e);
    }

    let mut stem_os = stem.to_os_string();
    if name_len_units(&stem_os) + overhead > MAX_FILENAME_LEN {
        let budget = MAX_FILENAME_LEN.saturating_sub(overhead);
        stem_os = truncate_stem(stem, budget);
    }

    let mut new_name = OsString::new();
    new_name.push(&stem_os);
    new_name.push(suffix);
    new_name.push(&ext_part);
    new_name
}

fn truncate_stem(stem: &OsStr, budget: usize) -> OsString {
    if budget == 0 {
        return OsString::from("f");
    }
    if let Some(stem_str) = stem.to_str() {
        let mut acc = String::new();
        for ch in stem_str.chars() {
            if acc.len() + ch.len_utf8() > budget {
                break;
            }
            acc.push(ch);
        }
        if acc.is_empty() {
            acc.push('f');
        }
        return OsString::from(acc);
    }
    // Not valid UTF-8: byte-wise on Unix, lossy elsewhere.
    #[cfg(unix)]
    let truncated = {
        use std::os::unix::ffi::{OsStrExt, OsStringExt};
        let bytes = stem.as_bytes();
        OsString::from_vec(bytes[..bytes.len().min(budget)].to_vec())
    };
    #[cfg(not(unix))]
    let truncated = {
        let lossy: String = stem.to_string_lossy().chars().take(budget).collect();
        OsString::from(lossy)
    };
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn dirs() -> (tempfile::TempDir, std::path::PathBuf, std::path::PathBuf) {
        let td = tempdir().unwrap();
        let files = td.path().join("files");
        let info = td.path().join("info");
        fs::create_dir_all(&files).unwrap();
        fs::create_dir_all(&info).unwrap();
        (td, files, info)
    }

    #[test]
    fn no_collision_keeps_name() {
        let (_td, files, info) = dirs();
        assert_eq!(resolve_entry_name(&files, &info, OsStr::new("file.txt")), "file.txt");
    }

    #[test]
    fn collisions_increment_suffix() {
        let (_td, files, info) = dirs();
        fs::write(files.join("file.txt"), b"1").unwrap();
        fs::write(files.join("file (2).txt"), b"2").unwrap();
        assert_eq!(
            resolve_entry_name(&files, &info, OsStr::new("file.txt")),
            "file (3).txt"
        );
    }

    #[test]
    fn orphaned_record_also_reserves_the_name() {
        let (_td, files, info) = dirs();
        fs::write(info.join("notes.md.trashinfo"), b"[Trash Info]\n").unwrap();
        assert_eq!(
            resolve_entry_name(&files, &info, OsStr::new("notes.md")),
            "notes (2).md"
        );
    }

    #[test]
    fn dotfile_and_multi_extension_positions() {
        let (_td, files, info) = dirs();
        fs::write(files.join(".env"), b"a").unwrap();
        fs::write(files.join("archive.tar.gz"), b"a").unwrap();
        assert_eq!(resolve_entry_name(&files, &info, OsStr::new(".env")), ".env (2)");
        assert_eq!(
            resolve_entry_name(&files, &info, OsStr::new("archive.tar.gz")),
            "archive.tar (2).gz"
        );
    }

    #[test]
    fn long_names_leave_room_for_record_suffix() {
        let (_td, files, info) = dirs();
        let long = "x".repeat(300);
        let name = resolve_entry_name(&files, &info, OsStr::new(&format!("{long}.txt")));
        assert!(name_len_units(&name) + INFO_FILE_EXTENSION.len() <= 255);
        assert!(name.to_string_lossy().ends_with(".txt"));
    }
}

//! I/O error descriptions.
//!
//! Builds human-friendly messages with the operation, the path and a
//! platform-aware hint, used for the `context` of permission errors and for
//! warnings about orphaned records.

use std::io;
use std::path::Path;

/// Format a human-friendly message with op/path plus platform-aware hints.
pub fn describe_io_error(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);

    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            match code {
                libc::EACCES | libc::EPERM => {
                    msg.push_str(" (permission denied; check ownership and write permissions)");
                }
                libc::EXDEV => {
                    msg.push_str(" (cross-filesystem; atomic rename not possible)");
                }
                libc::EBUSY => {
                    msg.push_str(" (resource busy; ensure no other process is using it)");
                }
                libc::ENOENT => {
                    msg.push_str(" (path not found; it may have been removed concurrently)");
                }
                libc::ENOTEMPTY => {
                    msg.push_str(" (directory not empty)");
                }
                libc::ENOSPC => {
                    msg.push_str(" (insufficient space on device)");
                }
                libc::EROFS => {
                    msg.push_str(" (read-only filesystem; cannot write here)");
                }
                libc::ENAMETOOLONG => {
                    msg.push_str(" (filename or path too long)");
                }
                _ => {}
            }
        }
        #[cfg(windows)]
        {
            match code {
                5 => msg.push_str(" (access denied; check permissions)"),
                17 => msg.push_str(" (not same device; cross-filesystem move)"),
                32 => msg.push_str(" (sharing violation; file is in use)"),
                2 | 3 => msg.push_str(" (path not found)"),
                112 => msg.push_str(" (insufficient disk space)"),
                _ => {}
            }
        }
        msg.push_str(&format!(" [os code: {}]", code));
    } else {
        match e.kind() {
            io::ErrorKind::PermissionDenied => {
                msg.push_str(" (permission denied; check ownership and write permissions)");
            }
            io::ErrorKind::NotFound => {
                msg.push_str(" (path not found; it may have been removed concurrently)");
            }
            io::ErrorKind::AlreadyExists => {
                msg.push_str(" (already exists)");
            }
            _ => {}
        }
    }

    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notfound_fallback_hint_includes_path() {
        let p = Path::new("/nonexistent/path/for/test");
        let msg = describe_io_error("rename", p, &io::Error::from(io::ErrorKind::NotFound));
        assert!(msg.contains("rename"));
        assert!(msg.contains("/nonexistent/path/for/test"));
        assert!(msg.contains("path not found"));
    }

    #[cfg(unix)]
    #[test]
    fn eacces_hint_and_code_present() {
        let p = Path::new("/tmp");
        let msg = describe_io_error("write", p, &io::Error::from_raw_os_error(libc::EACCES));
        assert!(msg.contains("permission denied"), "msg was: {}", msg);
        assert!(msg.contains("[os code: 13]"), "msg was: {}", msg);
    }
}

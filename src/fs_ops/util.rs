use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Resolve `..` and symlinked ancestors of `path`. The final component is
/// kept as is, so a symlink named on the command line stays a leaf.
pub fn resolve_parent(path: &Path) -> io::Result<PathBuf> {
    let abs = std::path::absolute(path)?;
    match (abs.parent(), abs.file_name()) {
        (Some(parent), Some(name)) => Ok(fs::canonicalize(parent)?.join(name)),
        // "/" or a path ending in ".."
        _ => fs::canonicalize(&abs),
    }
}

/// Canonicalize the deepest existing ancestor of `path` and re-attach the
/// components that do not exist yet. Falls back to the absolute form.
pub fn resolve_existing_prefix(path: &Path) -> PathBuf {
    let abs = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut missing = Vec::new();
    let mut cur = abs.as_path();
    loop {
        if let Ok(real) = fs::canonicalize(cur) {
            return missing.iter().rev().fold(real, |acc, name| acc.join(name));
        }
        match (cur.parent(), cur.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                cur = parent;
            }
            _ => return abs,
        }
    }
}

pub(super) fn is_cross_device(e: &io::Error) -> bool {
    // std::io::ErrorKind::CrossesDevices is still unstable,
    // so detect EXDEV / ERROR_NOT_SAME_DEVICE via raw OS error codes.
    match e.raw_os_error() {
        #[cfg(unix)]
        Some(code) => code == libc::EXDEV,
        #[cfg(windows)]
        Some(code) => code == 17,
        #[cfg(not(any(unix, windows)))]
        Some(_) => false,
        None => false,
    }
}

#[cfg(unix)]
pub(super) fn fsync_dir(dir: &Path) -> io::Result<()> {
    let f = File::open(dir)?;
    f.sync_all()
}

#[cfg(not(unix))]
pub(super) fn fsync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_parent_collapses_dot_dot() {
        let td = tempfile::tempdir().unwrap();
        let real = fs::canonicalize(td.path()).unwrap();
        fs::create_dir(real.join("sub")).unwrap();
        assert_eq!(resolve_parent(&real.join("sub").join("..")).unwrap(), real);
        assert_eq!(
            resolve_parent(&real.join("sub").join("..").join("x")).unwrap(),
            real.join("x")
        );
    }

    #[cfg(unix)]
    #[test]
    fn resolve_parent_keeps_symlinked_leaf() {
        let td = tempfile::tempdir().unwrap();
        let real = fs::canonicalize(td.path()).unwrap();
        fs::create_dir(real.join("target")).unwrap();
        std::os::unix::fs::symlink(real.join("target"), real.join("link")).unwrap();
        assert_eq!(resolve_parent(&real.join("link")).unwrap(), real.join("link"));
        assert_eq!(
            resolve_parent(&real.join("link").join("f")).unwrap(),
            real.join("target").join("f")
        );
    }

    #[test]
    fn existing_prefix_resolves_and_keeps_missing_tail() {
        let td = tempfile::tempdir().unwrap();
        let real = fs::canonicalize(td.path()).unwrap();
        fs::create_dir(real.join("sub")).unwrap();
        let wanted = real.join("sub").join("..").join("basket").join("files");
        assert_eq!(resolve_existing_prefix(&wanted), real.join("basket").join("files"));
    }

    #[cfg(unix)]
    #[test]
    fn exdev_is_cross_device() {
        assert!(is_cross_device(&io::Error::from_raw_os_error(libc::EXDEV)));
        assert!(!is_cross_device(&io::Error::from_raw_os_error(libc::EACCES)));
        assert!(!is_cross_device(&io::Error::other("x")));
    }
}

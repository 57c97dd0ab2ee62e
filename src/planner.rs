//! Bottom-up removal planning.
//!
//! `TreePlanner::plan` turns a root path into a lazy, single-pass sequence of
//! [`CandidatePath`]s in the order they must be moved: every child before its
//! parent, siblings in directory-listing order.
//!
//! Coverage: a directory is yielded only when every entry currently listed in
//! it has already been yielded (a planned file, link or covered
//! subdirectory). A child vetoed by policy, or a subdirectory that could not
//! be read, leaves its parent uncovered; that status then blocks every
//! ancestor as well. Files that pass policy are yielded as soon as they are
//! visited, whether or not their directory ends up covered.
//!
//! The walk reads the live filesystem, so consumers may move each item as it
//! is yielded. Entries that disappear mid-walk simply stop counting.

use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::{DirEntry, WalkDir};

use crate::errors::{Result, SmartRmError};
use crate::policy::RemovalPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
}

impl EntryKind {
    /// Classify without following symlinks.
    pub fn from_file_type(ft: fs::FileType) -> Self {
        if ft.is_symlink() {
            EntryKind::Symlink
        } else if ft.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        }
    }

    pub fn is_dir(self) -> bool {
        self == EntryKind::Directory
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntryKind::File => "regular file",
            EntryKind::Directory => "directory",
            EntryKind::Symlink => "symbolic link",
        })
    }
}

/// An absolute path discovered by the walk, plus its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePath {
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl CandidatePath {
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

pub struct TreePlanner<'p> {
    policy: &'p dyn RemovalPolicy,
    exclude: Option<PathBuf>,
}

impl<'p> TreePlanner<'p> {
    pub fn new(policy: &'p dyn RemovalPolicy) -> Self {
        Self {
            policy,
            exclude: None,
        }
    }

    /// Never descend into `path` (the basket). It stays in place and its
    /// ancestors stay uncovered.
    pub fn excluding(mut self, path: impl Into<PathBuf>) -> Self {
        self.exclude = Some(path.into());
        self
    }

    /// Start planning `root`. The root must be absolute; it is not resolved here.
    pub fn plan(&self, root: &Path) -> Result<Plan<'p>> {
        let meta = fs::symlink_metadata(root).map_err(SmartRmError::io_with("stat", root))?;
        let kind = EntryKind::from_file_type(meta.file_type());

        if !kind.is_dir() {
            let single = self
                .policy
                .allows(root, kind)
                .then(|| CandidatePath::new(root, kind));
            debug!(root = %root.display(), planned = single.is_some(), "planning single item");
            return Ok(Plan {
                policy: self.policy,
                state: PlanState::Single(single),
            });
        }

        let exclude = self.exclude.clone();
        let walk = WalkDir::new(root)
            .follow_links(false)
            .contents_first(true)
            .into_iter()
            .filter_entry(move |e| exclude.as_deref() != Some(e.path()));

        debug!(root = %root.display(), "planning tree");
        Ok(Plan {
            policy: self.policy,
            state: PlanState::Tree {
                walk: Box::new(walk),
                covered: HashMap::new(),
            },
        })
    }
}

type Walk = Box<dyn Iterator<Item = walkdir::Result<DirEntry>>>;

enum PlanState {
    Single(Option<CandidatePath>),
    Tree {
        walk: Walk,
        /// Directory -> names of its children already yielded.
        covered: HashMap<PathBuf, HashSet<OsString>>,
    },
}

/// Lazy removal plan for one root. Not restartable.
pub struct Plan<'p> {
    policy: &'p dyn RemovalPolicy,
    state: PlanState,
}

impl Iterator for Plan<'_> {
    type Item = CandidatePath;

    fn next(&mut self) -> Option<CandidatePath> {
        match &mut self.state {
            PlanState::Single(item) => item.take(),
            PlanState::Tree { walk, covered } => loop {
                let entry = match walk.next()? {
                    Ok(entry) => entry,
                    Err(e) => {
                        let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                        warn!(path = %path, error = %e, "skipping unreadable entry");
                        continue;
                    }
                };
                if let Some(candidate) = visit(self.policy, covered, entry) {
                    debug!(path = %candidate.path.display(), kind = %candidate.kind, "planned");
                    return Some(candidate);
                }
            },
        }
    }
}

/// Post-order visit of one entry. Returns the entry when it joins the plan.
fn visit(
    policy: &dyn RemovalPolicy,
    covered: &mut HashMap<PathBuf, HashSet<OsString>>,
    entry: DirEntry,
) -> Option<CandidatePath> {
    let kind = EntryKind::from_file_type(entry.file_type());
    let is_root = entry.depth() == 0;
    let path = entry.into_path();

    if kind.is_dir() {
        let claimed = covered.remove(&path).unwrap_or_default();
        if !is_fully_covered(&path, &claimed) {
            trace!(dir = %path.display(), "directory keeps uncovered children");
            return None;
        }
    }

    if !policy.allows(&path, kind) {
        return None;
    }

    if !is_root
        && let (Some(parent), Some(name)) = (path.parent(), path.file_name())
    {
        covered
            .entry(parent.to_path_buf())
            .or_default()
            .insert(name.to_os_string());
    }
    Some(CandidatePath::new(path, kind))
}

/// Compare the directory's current listing with the names already yielded.
fn is_fully_covered(dir: &Path, claimed: &HashSet<OsString>) -> bool {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(dir = %dir.display(), error = %e, "cannot list directory; leaving it in place");
            }
            return false;
        }
    };
    for entry in entries {
        match entry {
            Ok(entry) if claimed.contains(&entry.file_name()) => {}
            Ok(entry) => {
                trace!(dir = %dir.display(), child = ?entry.file_name(), "uncovered child");
                return false;
            }
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "cannot list directory; leaving it in place");
                return false;
            }
        }
    }
    true
}

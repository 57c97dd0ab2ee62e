//! Batch removal.
//!
//! Each user-supplied path is handled on its own: pre-check for the requested
//! mode, plan, move each planned item, write its record. Failures from the
//! per-path taxonomy (not empty, wrong kind, permission, not found) are
//! logged and recorded in the report; anything else stops the batch.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::basket::Basket;
use crate::config::Config;
use crate::errors::{Result, SmartRmError};
use crate::fs_ops::{BasketMover, ItemMover, MovedItem, resolve_parent};
use crate::planner::{CandidatePath, TreePlanner};
use crate::policy::{Policy, RemovalPolicy};
use crate::record::TrashRecordWriter;
use crate::shutdown;

/// What kind of removal the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveMode {
    /// Files only; directories are refused.
    Files,
    /// Empty directories only.
    Directories,
    /// Files or whole directory trees.
    Trees,
}

#[derive(Debug, Default)]
pub struct RemovalSummary {
    pub moved: Vec<MovedItem>,
    /// Items a dry run would have moved, in plan order.
    pub would_move: Vec<CandidatePath>,
    /// Planned items that disappeared before they could be moved.
    pub vanished: usize,
    /// Moved items whose record could not be written.
    pub orphaned: usize,
}

impl RemovalSummary {
    /// True when the policy vetoed everything (or there was nothing to do).
    pub fn is_noop(&self) -> bool {
        self.moved.is_empty() && self.would_move.is_empty()
    }
}

#[derive(Debug)]
pub enum RemovalOutcome {
    Completed(RemovalSummary),
    Failed(SmartRmError),
}

impl RemovalOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, RemovalOutcome::Failed(_))
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<(PathBuf, RemovalOutcome)>,
    /// Set when a shutdown request stopped the batch early.
    pub interrupted: bool,
}

impl BatchReport {
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &SmartRmError)> {
        self.outcomes.iter().filter_map(|(p, o)| match o {
            RemovalOutcome::Failed(e) => Some((p.as_path(), e)),
            RemovalOutcome::Completed(_) => None,
        })
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|(_, o)| o.is_failed())
    }

    pub fn moved_count(&self) -> usize {
        self.outcomes
            .iter()
            .map(|(_, o)| match o {
                RemovalOutcome::Completed(s) => s.moved.len(),
                RemovalOutcome::Failed(_) => 0,
            })
            .sum()
    }
}

pub struct Remover {
    basket: Basket,
    policy: Box<dyn RemovalPolicy>,
    mover: Box<dyn ItemMover>,
    writer: TrashRecordWriter,
    dry_run: bool,
}

impl Remover {
    /// Remover for the configured basket with an explicit policy.
    pub fn new(cfg: &Config, policy: Box<dyn RemovalPolicy>) -> Self {
        let basket = Basket::new(&cfg.basket);
        Self {
            mover: Box::new(BasketMover::new(basket.info_dir())),
            writer: TrashRecordWriter::new(basket.clone()),
            basket,
            policy,
            dry_run: cfg.dry_run,
        }
    }

    /// Remover with the configured name filter and terminal prompts.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self::new(cfg, Box::new(Policy::from_config(cfg)?)))
    }

    pub fn with_mover(mut self, mover: Box<dyn ItemMover>) -> Self {
        self.mover = mover;
        self
    }

    pub fn basket(&self) -> &Basket {
        &self.basket
    }

    pub fn remove_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<BatchReport> {
        self.remove_list(paths, RemoveMode::Files)
    }

    pub fn remove_directories<P: AsRef<Path>>(&self, paths: &[P]) -> Result<BatchReport> {
        self.remove_list(paths, RemoveMode::Directories)
    }

    pub fn remove_trees<P: AsRef<Path>>(&self, paths: &[P]) -> Result<BatchReport> {
        self.remove_list(paths, RemoveMode::Trees)
    }

    pub fn remove_list<P: AsRef<Path>>(&self, paths: &[P], mode: RemoveMode) -> Result<BatchReport> {
        if !self.dry_run {
            self.basket.ensure()?;
        }

        let mut report = BatchReport::default();
        for path in paths {
            if shutdown::is_requested() {
                warn!("shutdown requested; skipping remaining paths");
                report.interrupted = true;
                break;
            }
            let path = path.as_ref();
            match self.remove_path(path, mode) {
                Ok(summary) => {
                    if summary.is_noop() {
                        debug!(path = %path.display(), "nothing removed");
                    }
                    report
                        .outcomes
                        .push((path.to_path_buf(), RemovalOutcome::Completed(summary)));
                }
                Err(e) if e.is_recoverable() => {
                    let offending = e.path().unwrap_or(path);
                    error!(code = e.code(), kind = e.kind(), path = %offending.display(), error = %e, "Removal failed");
                    report
                        .outcomes
                        .push((path.to_path_buf(), RemovalOutcome::Failed(e)));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(report)
    }

    /// Remove a single top-level path. Returns taxonomy errors as `Err`.
    pub fn remove_path(&self, path: &Path, mode: RemoveMode) -> Result<RemovalSummary> {
        let root = resolve_parent(path).map_err(SmartRmError::io_with("resolve path", path))?;
        verify_removal(&root, mode)?;
        self.ensure_outside_basket(&root)?;

        let planner = TreePlanner::new(self.policy.as_ref()).excluding(self.basket.root());
        let mut summary = RemovalSummary::default();

        for item in planner.plan(&root)? {
            if self.dry_run {
                info!(path = %item.path.display(), kind = %item.kind, "dry-run: would move to basket");
                summary.would_move.push(item);
                continue;
            }
            match self.mover.move_item(&item, self.basket.files_dir()) {
                Ok(moved) => {
                    if !self.writer.record(&moved).is_written() {
                        summary.orphaned += 1;
                    }
                    summary.moved.push(moved);
                }
                Err(SmartRmError::NotFound(p)) if p != root => {
                    debug!(path = %p.display(), "planned item vanished; skipping");
                    summary.vanished += 1;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(summary)
    }

    fn ensure_outside_basket(&self, root: &Path) -> Result<()> {
        if root.starts_with(self.basket.root()) {
            return Err(SmartRmError::PermissionDenied {
                path: root.to_path_buf(),
                context: format!("refusing to remove from inside the basket '{}'", self.basket.root().display()),
            });
        }
        Ok(())
    }
}

/// Mode pre-check on the resolved path.
fn verify_removal(root: &Path, mode: RemoveMode) -> Result<()> {
    let meta = fs::symlink_metadata(root).map_err(SmartRmError::io_with("stat", root))?;
    let is_dir = meta.file_type().is_dir();
    match mode {
        RemoveMode::Files if is_dir => Err(SmartRmError::WrongKind {
            path: root.to_path_buf(),
            expected: "a file (use -r for directories)",
        }),
        RemoveMode::Directories if !is_dir => Err(SmartRmError::WrongKind {
            path: root.to_path_buf(),
            expected: "a directory",
        }),
        RemoveMode::Directories => {
            let mut entries = fs::read_dir(root).map_err(SmartRmError::io_with("list directory", root))?;
            if entries.next().is_some() {
                Err(SmartRmError::NotEmpty(root.to_path_buf()))
            } else {
                Ok(())
            }
        }
        RemoveMode::Files | RemoveMode::Trees => Ok(()),
    }
}

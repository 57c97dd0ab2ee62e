//! Core library for `smart_rm`.
//!
//! Moves files and directory trees into a basket instead of deleting them.
//! Each moved entry gets a `.trashinfo` record next to it so it can be
//! restored later. Directories are only moved once everything inside them
//! has been moved, so a tree the user partially declines stays in place.
//!
//! Layout:
//! - `planner`: bottom-up traversal that decides what to move and in what order.
//! - `policy`: relevance (name filter) and confirmation decisions.
//! - `fs_ops`: single-item moves, collision-free naming.
//! - `record`: restoration records.
//! - `remover`: per-path batch driver with the error taxonomy.

pub mod basket;
pub mod cli;
pub mod config;
pub mod errors;
pub mod fs_ops;
pub mod output;
pub mod planner;
pub mod platform;
pub mod policy;
pub mod record;
pub mod remover;
pub mod shutdown;

pub use basket::Basket;
pub use config::{
    CONFIG_ENV, Config, ConfirmMode, LogLevel, default_basket_path, default_config_path,
    default_log_path, load_config, load_config_from_xml_path, path_has_symlink_ancestor,
};
pub use errors::{Result, SmartRmError};
pub use fs_ops::{BasketMover, ItemMover, MovedItem};
pub use planner::{CandidatePath, EntryKind, Plan, TreePlanner};
pub use policy::{FnPolicy, NameFilter, Policy, Prompter, RemovalPolicy, TerminalPrompter, allow_all};
pub use record::{RecordStatus, TrashRecord, TrashRecordWriter};
pub use remover::{BatchReport, RemovalOutcome, RemovalSummary, RemoveMode, Remover};

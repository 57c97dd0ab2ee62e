//! Filesystem operations used to move items into the basket.

mod atomic;
mod duplicate;
mod helpers;
mod mover;
mod util;

pub use duplicate::resolve_entry_name;
pub use helpers::describe_io_error;
pub use mover::{BasketMover, ItemMover, MovedItem};
pub use util::{resolve_existing_prefix, resolve_parent};

//! # filestore-clean
//!
//! Staged cleanup for a filestore: an overlay block store whose entries are
//! references into externally managed files rather than copies of them.
//!
//! Entries go bad over time. A referenced file is edited or removed, a node
//! loses some of its children, a subtree stops being reachable from any
//! root. This crate takes a list of cleanup categories and removes the
//! matching entries:
//!
//! - **Category aliases**: `invalid` and `full` expand breadth-first to the
//!   leaf categories they stand for
//! - **Ordered stages**: cheap per-entry checks run before the full graph
//!   walks, and each stage is scanned completely before anything is deleted
//! - **Streaming progress**: a backpressured reader is handed back right
//!   away while a worker thread does the scanning and deleting
//! - **All-or-stop**: the first bad category, scan failure or delete failure
//!   ends the operation and the reader sees the error
//!
//! Verification and deletion themselves are provided by the caller through
//! the [`filestore::Filestore`] trait.

pub mod cleaner;
pub mod common;
pub mod filestore;

pub use cleaner::{clean, clean_with_config, CleanPlan, ProgressReader};
pub use common::config::CleanConfig;
pub use common::errors::CleanError;
pub use filestore::{Filestore, Key, ListRes, ScanStream, Status};

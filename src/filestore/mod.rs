pub mod types;

pub use types::{Key, ListRes, ScanStream, Status};

use anyhow::Result;

/// Verification and deletion services of a filestore.
///
/// The cleaner never looks inside the store. It asks for scans, reads the
/// reported statuses, and deletes entries one key at a time. `Request` is
/// whatever per-call context the store needs (node handle, command request,
/// ...); it is moved into the cleanup worker and lent to every call.
pub trait Filestore: Send + Sync + 'static {
    type Request: Send + 'static;

    /// Shallow per-entry check of every entry against its backing file
    fn verify_basic(
        &self,
        req: &Self::Request,
        level: u32,
        concurrency: usize,
    ) -> Result<ScanStream>;

    /// Full graph walk. With `skip_orphans` set, orphan detection is left out.
    fn verify_full(
        &self,
        req: &Self::Request,
        level: u32,
        concurrency: usize,
        skip_orphans: bool,
    ) -> Result<ScanStream>;

    /// Remove a single entry
    fn delete(&self, req: &Self::Request, key: &Key) -> Result<()>;

    /// Render a key for humans
    fn encode_for_display(&self, key: &Key) -> String {
        key.to_string()
    }
}

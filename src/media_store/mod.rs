/// Media Storage Adapters
///
/// The resolver only ever sees the `StorageAdapter` trait. Paths are
/// `/`-separated and relative to the adapter's root, e.g. `media/cat.png`.

pub mod disk;
pub mod memory;

pub use disk::DiskAdapter;
pub use memory::MemoryAdapter;

use crate::error::LocalizerResult;
use async_trait::async_trait;

/// Result of a create-only write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file did not exist and now holds the given bytes
    Written,
    /// Something already lives at that path; nothing was written
    AlreadyExists,
}

/// Storage backend trait
///
/// Implementations must never overwrite or truncate an existing file.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Check if a file exists
    async fn exists(&self, path: &str) -> LocalizerResult<bool>;

    /// Read a whole file
    async fn read_binary(&self, path: &str) -> LocalizerResult<Vec<u8>>;

    /// Create a new file, failing softly if the path is already taken
    async fn create_binary(&self, path: &str, data: &[u8]) -> LocalizerResult<WriteOutcome>;
}

/// Join a directory and a file name with `/`, ignoring redundant separators
pub fn join_path(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() || dir == "." {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Link digest memo
///
/// Remembers the SHA-256 of the bytes downloaded for each link so repeated
/// comparisons against files on disk only hash the file side.
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::RwLock;

/// SHA-256 digest of a byte buffer
pub type ContentDigest = [u8; 32];

/// Digest remembered for one link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashEntry {
    pub link: String,
    pub digest: ContentDigest,
}

impl HashEntry {
    pub fn hex(&self) -> String {
        hex::encode(self.digest)
    }
}

/// Link → content digest mapping, shared by every resolution of a pipeline
///
/// Entries are created on first use and never replaced.
#[derive(Debug, Default)]
pub struct HashStore {
    entries: RwLock<HashMap<String, HashEntry>>,
}

/// Hash a byte buffer
pub fn digest_of(data: &[u8]) -> ContentDigest {
    Sha256::digest(data).into()
}

impl HashStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute and remember the digest of `data` for `link`, unless one exists
    pub fn ensure_computed(&self, link: &str, data: &[u8]) {
        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            if entries.contains_key(link) {
                return;
            }
        }

        // Hash outside the lock; if another caller got here first, its
        // entry wins and ours is dropped.
        let digest = digest_of(data);
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.entry(link.to_string()).or_insert_with(|| HashEntry {
            link: link.to_string(),
            digest,
        });
    }

    /// True iff a digest exists for `link` and equals the digest of `data`
    pub fn matches(&self, link: &str, data: &[u8]) -> bool {
        let expected = match self.get(link) {
            Some(entry) => entry.digest,
            None => return false,
        };
        digest_of(data) == expected
    }

    pub fn get(&self, link: &str) -> Option<HashEntry> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(link).cloned()
    }

    /// Hex digest for a link, if computed
    pub fn digest_hex(&self, link: &str) -> Option<String> {
        self.get(link).map(|entry| entry.hex())
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Name resolution: reuse an identical file or find a free name
use crate::{
    error::{LocalizerError, LocalizerResult},
    hash_store::HashStore,
    media_store::StorageAdapter,
    naming::{CandidateName, NameCandidates},
};
use std::sync::Arc;
use tracing::debug;

/// Outcome of one resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub candidate: CandidateName,
    /// False on a dedup hit: the file already holds these bytes
    pub need_write: bool,
}

/// Walks candidate names for a base name and decides reuse vs write
///
/// Must only be called while holding the `KeyedLock` for the base name;
/// the check/read/write sequence is not safe otherwise.
#[derive(Debug, Clone)]
pub struct NameResolver {
    hashes: Arc<HashStore>,
    suffix_length: usize,
    max_attempts: usize,
}

impl NameResolver {
    pub fn new(hashes: Arc<HashStore>, suffix_length: usize, max_attempts: usize) -> Self {
        Self {
            hashes,
            suffix_length,
            max_attempts,
        }
    }

    pub fn hashes(&self) -> &Arc<HashStore> {
        &self.hashes
    }

    /// Pick the file name for `data` downloaded from `link`
    ///
    /// Candidates that exist with different content are skipped; existing
    /// files are never modified. Gives up with `NameSpaceExhausted` after
    /// `max_attempts` candidates.
    pub async fn resolve(
        &self,
        adapter: &dyn StorageAdapter,
        directory: &str,
        base: &str,
        link: &str,
        data: &[u8],
        extension: &str,
    ) -> LocalizerResult<Resolution> {
        let candidates = NameCandidates::new(directory, base, extension, self.suffix_length);

        for candidate in candidates.take(self.max_attempts) {
            if !adapter.exists(&candidate.path).await? {
                debug!("Candidate {} is free", candidate.path);
                return Ok(Resolution {
                    candidate,
                    need_write: true,
                });
            }

            self.hashes.ensure_computed(link, data);
            let existing = adapter.read_binary(&candidate.path).await?;

            if self.hashes.matches(link, &existing) {
                debug!("Candidate {} already holds {}", candidate.path, link);
                return Ok(Resolution {
                    candidate,
                    need_write: false,
                });
            }

            debug!("Candidate {} holds different content, trying next", candidate.path);
        }

        Err(LocalizerError::NameSpaceExhausted {
            base: base.to_string(),
            attempts: self.max_attempts,
        })
    }
}

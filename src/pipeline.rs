/// Ingestion pipeline: one image reference in, replacement text out
///
/// Flow per reference: validate link → fetch → sniff extension → derive
/// base name → (locked) resolve name and write → replacement text. Any
/// failure along the way yields the original reference unchanged.
use crate::{
    config::MediaConfig,
    error::{LocalizerError, LocalizerResult},
    fetch::Fetcher,
    gate::KeyedLock,
    hash_store::HashStore,
    media_store::{StorageAdapter, WriteOutcome},
    metrics,
    naming::derive_base_name,
    resolver::{NameResolver, Resolution},
    sniff::extension_of,
};
use reqwest::Url;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// An inline image reference found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Exact source text of the reference, returned on any fallback
    pub original: String,
    pub anchor: String,
    pub link: String,
}

impl ImageReference {
    pub fn new(
        original: impl Into<String>,
        anchor: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            original: original.into(),
            anchor: anchor.into(),
            link: link.into(),
        }
    }

    /// Build a reference whose source text is `![anchor](link)`
    pub fn markdown(anchor: &str, link: &str) -> Self {
        Self::new(format!("![{}]({})", anchor, link), anchor, link)
    }
}

/// What happened to one reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Points at a local copy now
    Rewritten {
        text: String,
        path: String,
        /// False when an identical file was already there
        written: bool,
    },
    /// Not a remote image; left alone
    Skipped { text: String },
    /// Something failed; the original text is kept
    Fallback { text: String, reason: String },
}

impl ProcessOutcome {
    pub fn text(&self) -> &str {
        match self {
            ProcessOutcome::Rewritten { text, .. }
            | ProcessOutcome::Skipped { text }
            | ProcessOutcome::Fallback { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            ProcessOutcome::Rewritten { text, .. }
            | ProcessOutcome::Skipped { text }
            | ProcessOutcome::Fallback { text, .. } => text,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ProcessOutcome::Rewritten { .. } => "rewritten",
            ProcessOutcome::Skipped { .. } => "skipped",
            ProcessOutcome::Fallback { .. } => "fallback",
        }
    }
}

/// Parse a link as an absolute http(s) URL
pub fn remote_url(link: &str) -> Option<Url> {
    let url = Url::parse(link.trim()).ok()?;
    match url.scheme() {
        "http" | "https" if url.host().is_some() => Some(url),
        _ => None,
    }
}

/// Format the replacement reference for a stored file
///
/// Paths with whitespace or parentheses are wrapped in `<...>` so the
/// link stays valid Markdown.
pub fn replacement_text(anchor: &str, path: &str) -> String {
    let needs_brackets = path
        .chars()
        .any(|c| c.is_whitespace() || c == '(' || c == ')');
    if needs_brackets {
        format!("![{}](<{}>)", anchor, path)
    } else {
        format!("![{}]({})", anchor, path)
    }
}

/// Rewrites remote image references into local copies
///
/// Cheap to clone; clones share the hash store, the lock table and the
/// collaborators.
#[derive(Clone)]
pub struct IngestionPipeline {
    media: MediaConfig,
    adapter: Arc<dyn StorageAdapter>,
    fetcher: Arc<dyn Fetcher>,
    resolver: NameResolver,
    gate: Arc<KeyedLock>,
}

impl IngestionPipeline {
    /// Create a pipeline with a fresh hash store and lock table
    pub fn new(
        media: MediaConfig,
        adapter: Arc<dyn StorageAdapter>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        let resolver = NameResolver::new(
            Arc::new(HashStore::new()),
            media.suffix_length,
            media.max_name_attempts,
        );

        Self {
            media,
            adapter,
            fetcher,
            resolver,
            gate: Arc::new(KeyedLock::new()),
        }
    }

    pub fn hashes(&self) -> &Arc<HashStore> {
        self.resolver.hashes()
    }

    pub fn gate(&self) -> &Arc<KeyedLock> {
        &self.gate
    }

    /// Replacement text for a reference; never fails
    pub async fn process(&self, reference: &ImageReference) -> String {
        self.process_reference(reference).await.into_text()
    }

    /// Process a reference and report what happened
    pub async fn process_reference(&self, reference: &ImageReference) -> ProcessOutcome {
        let outcome = match remote_url(&reference.link) {
            None => ProcessOutcome::Skipped {
                text: reference.original.clone(),
            },
            Some(url) => match self.localize(reference, &url).await {
                Ok(outcome) => outcome,
                Err(LocalizerError::UnknownContentType(link)) => {
                    debug!("Not an image I can store, leaving {} as is", link);
                    ProcessOutcome::Skipped {
                        text: reference.original.clone(),
                    }
                }
                Err(e) => {
                    warn!("Image processing failed for {}: {}", reference.link, e);
                    ProcessOutcome::Fallback {
                        text: reference.original.clone(),
                        reason: e.to_string(),
                    }
                }
            },
        };

        metrics::record_reference(outcome.label());
        outcome
    }

    async fn localize(
        &self,
        reference: &ImageReference,
        url: &Url,
    ) -> LocalizerResult<ProcessOutcome> {
        let link = reference.link.trim();

        let started = Instant::now();
        let fetched = self.fetcher.fetch(link).await;
        metrics::record_fetch(started.elapsed().as_secs_f64(), fetched.is_ok());
        let data = fetched?;

        let extension = extension_of(&data)
            .ok_or_else(|| LocalizerError::UnknownContentType(link.to_string()))?;

        let base = derive_base_name(
            &reference.anchor,
            url,
            extension,
            &self.media.filename_template,
        );

        for attempt in 1..=self.media.max_write_attempts {
            let stored = self
                .gate
                .with_lock(&base, || self.resolve_and_store(&base, link, &data, extension))
                .await?;

            match stored {
                Some(resolution) => {
                    let path = resolution.candidate.path;
                    return Ok(ProcessOutcome::Rewritten {
                        text: replacement_text(&reference.anchor, &path),
                        path,
                        written: resolution.need_write,
                    });
                }
                None => {
                    metrics::record_write_race();
                    debug!(
                        "Name for {} taken before write (attempt {}/{}), resolving again",
                        link, attempt, self.media.max_write_attempts
                    );
                }
            }
        }

        Err(LocalizerError::WriteConflict {
            attempts: self.media.max_write_attempts,
        })
    }

    /// Runs inside the lock for `base`. `None` means the chosen name was
    /// created by someone else between the existence check and the write.
    async fn resolve_and_store(
        &self,
        base: &str,
        link: &str,
        data: &[u8],
        extension: &str,
    ) -> LocalizerResult<Option<Resolution>> {
        let resolution = self
            .resolver
            .resolve(
                self.adapter.as_ref(),
                &self.media.directory,
                base,
                link,
                data,
                extension,
            )
            .await?;

        if !resolution.need_write {
            metrics::record_dedup_hit();
            debug!("Reusing {} for {}", resolution.candidate.path, link);
            return Ok(Some(resolution));
        }

        match self.adapter.create_binary(&resolution.candidate.path, data).await? {
            WriteOutcome::Written => {
                metrics::record_file_written();
                info!("Saved {} as {}", link, resolution.candidate.path);
                Ok(Some(resolution))
            }
            WriteOutcome::AlreadyExists => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_url() {
        assert!(remote_url("https://example.com/cat.png").is_some());
        assert!(remote_url("http://example.com/cat.png").is_some());
        assert!(remote_url("media/cat.png").is_none());
        assert!(remote_url("./cat.png").is_none());
        assert!(remote_url("file:///tmp/cat.png").is_none());
        assert!(remote_url("data:image/png;base64,AAAA").is_none());
    }

    #[test]
    fn test_replacement_text() {
        assert_eq!(replacement_text("", "media/cat.png"), "![](media/cat.png)");
        assert_eq!(replacement_text("a cat", "media/cat.png"), "![a cat](media/cat.png)");
        assert_eq!(
            replacement_text("My Cat", "media/My Cat.png"),
            "![My Cat](<media/My Cat.png>)"
        );
    }

    #[test]
    fn test_markdown_reference() {
        let reference = ImageReference::markdown("cat", "https://example.com/cat.png");
        assert_eq!(reference.original, "![cat](https://example.com/cat.png)");
    }

    #[test]
    fn test_outcome_text() {
        let outcome = ProcessOutcome::Fallback {
            text: "![](https://x.test/a.png)".to_string(),
            reason: "boom".to_string(),
        };
        assert_eq!(outcome.text(), "![](https://x.test/a.png)");
        assert_eq!(outcome.label(), "fallback");
    }
}

//! Image Localizer
//!
//! Rewrites references to remote images in Markdown into references to
//! local copies. Each image is downloaded once and stored under a name
//! derived from its anchor or URL; identical content is reused instead of
//! written twice, even when many references race for the same name.

pub mod config;
pub mod document;
pub mod error;
pub mod fetch;
pub mod gate;
pub mod hash_store;
pub mod media_store;
pub mod metrics;
pub mod naming;
pub mod pipeline;
pub mod resolver;
pub mod sniff;

pub use config::LocalizerConfig;
pub use document::{DocumentRewriter, RewriteReport};
pub use error::{LocalizerError, LocalizerResult};
pub use fetch::{Fetcher, HttpFetcher};
pub use gate::KeyedLock;
pub use hash_store::HashStore;
pub use media_store::{DiskAdapter, MemoryAdapter, StorageAdapter, WriteOutcome};
pub use pipeline::{ImageReference, IngestionPipeline, ProcessOutcome};
pub use resolver::{NameResolver, Resolution};

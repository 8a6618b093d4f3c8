/// Markdown document rewriting
///
/// Finds inline image references `![anchor](link)` and sends each through
/// the ingestion pipeline, splicing the results back in document order.
use crate::pipeline::{ImageReference, IngestionPipeline, ProcessOutcome};
use futures::stream::{self, StreamExt};
use lazy_static::lazy_static;
use regex::Regex;
use std::ops::Range;
use tracing::info;

/// References processed at the same time by default
pub const DEFAULT_CONCURRENCY: usize = 8;

lazy_static! {
    /// `![anchor](link)` with an optional `"title"` after the link
    static ref IMAGE_REFERENCE: Regex =
        Regex::new(r#"!\[(?P<anchor>[^\]\n]*)\]\((?P<link>[^)\s]+)(?:\s+"[^"\n]*")?\)"#)
            .unwrap();
}

/// Result of rewriting one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    pub text: String,
    pub rewritten: usize,
    /// Rewritten references that caused a new file to be written
    pub written: usize,
    pub skipped: usize,
    pub fallback: usize,
}

impl RewriteReport {
    pub fn total(&self) -> usize {
        self.rewritten + self.skipped + self.fallback
    }
}

/// All inline image references in `text`, with their byte ranges
pub fn find_references(text: &str) -> Vec<(Range<usize>, ImageReference)> {
    IMAGE_REFERENCE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let anchor = caps.name("anchor")?.as_str();
            let link = caps.name("link")?.as_str();
            Some((
                whole.range(),
                ImageReference::new(whole.as_str(), anchor, link),
            ))
        })
        .collect()
}

/// Rewrites every image reference of a document through a pipeline
#[derive(Clone)]
pub struct DocumentRewriter {
    pipeline: IngestionPipeline,
    concurrency: usize,
}

impl DocumentRewriter {
    pub fn new(pipeline: IngestionPipeline) -> Self {
        Self {
            pipeline,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Limit how many references are in flight at once (minimum 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Rewrite `text`; text outside image references is kept byte-for-byte
    pub async fn rewrite(&self, text: &str) -> RewriteReport {
        let references = find_references(text);

        let outcomes: Vec<ProcessOutcome> = stream::iter(references.iter())
            .map(|(_, reference)| self.pipeline.process_reference(reference))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = RewriteReport {
            text: String::with_capacity(text.len()),
            ..Default::default()
        };
        let mut cursor = 0;

        for ((range, _), outcome) in references.iter().zip(outcomes) {
            report.text.push_str(&text[cursor..range.start]);
            match &outcome {
                ProcessOutcome::Rewritten { written, .. } => {
                    report.rewritten += 1;
                    if *written {
                        report.written += 1;
                    }
                }
                ProcessOutcome::Skipped { .. } => report.skipped += 1,
                ProcessOutcome::Fallback { .. } => report.fallback += 1,
            }
            report.text.push_str(outcome.text());
            cursor = range.end;
        }
        report.text.push_str(&text[cursor..]);

        if report.total() > 0 {
            info!(
                "Processed {} image references: {} rewritten ({} new files), {} skipped, {} failed",
                report.total(),
                report.rewritten,
                report.written,
                report.skipped,
                report.fallback
            );
        }

        report
    }
}

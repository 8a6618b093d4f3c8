/// Metrics for the image localizer
///
/// Provides Prometheus-compatible metrics for:
/// - References processed, by outcome
/// - Dedup hits and files written
/// - Download failures and latencies
/// - Write races lost to other writers

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram,
    IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    /// Image references processed, by outcome (rewritten, skipped, fallback)
    pub static ref REFERENCES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "localizer_references_total",
        "Total number of image references processed",
        &["outcome"]
    )
    .unwrap();

    /// Resolutions that reused an existing identical file
    pub static ref DEDUP_HITS_TOTAL: IntCounter = register_int_counter!(
        "localizer_dedup_hits_total",
        "Number of downloads that matched an existing local file"
    )
    .unwrap();

    /// Files created in the media directory
    pub static ref FILES_WRITTEN_TOTAL: IntCounter = register_int_counter!(
        "localizer_files_written_total",
        "Number of image files written"
    )
    .unwrap();

    /// Failed downloads
    pub static ref FETCH_FAILURES_TOTAL: IntCounter = register_int_counter!(
        "localizer_fetch_failures_total",
        "Number of failed image downloads"
    )
    .unwrap();

    /// Writes that found the chosen name already taken
    pub static ref WRITE_RACES_TOTAL: IntCounter = register_int_counter!(
        "localizer_write_races_total",
        "Number of writes that lost a race for a file name"
    )
    .unwrap();

    /// Download duration in seconds
    pub static ref FETCH_DURATION_SECONDS: Histogram = register_histogram!(
        "localizer_fetch_duration_seconds",
        "Image download latencies in seconds",
        vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .unwrap();
}

/// Render all registered metrics in Prometheus text format
pub fn render_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

pub fn record_reference(outcome: &str) {
    REFERENCES_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_dedup_hit() {
    DEDUP_HITS_TOTAL.inc();
}

pub fn record_file_written() {
    FILES_WRITTEN_TOTAL.inc();
}

pub fn record_write_race() {
    WRITE_RACES_TOTAL.inc();
}

/// Record a download attempt and how long it took
pub fn record_fetch(duration: f64, success: bool) {
    FETCH_DURATION_SECONDS.observe(duration);
    if !success {
        FETCH_FAILURES_TOTAL.inc();
    }
}

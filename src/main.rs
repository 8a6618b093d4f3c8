/// Image Localizer CLI
///
/// Downloads the remote images referenced by a Markdown file into a local
/// media directory and points the references at the local copies.

use anyhow::Context;
use clap::Parser;
use image_localizer::{
    metrics, DiskAdapter, DocumentRewriter, HttpFetcher, IngestionPipeline, LocalizerConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "image-localizer", version, about = "Store remote Markdown images locally")]
struct Args {
    /// Markdown file to rewrite
    file: PathBuf,

    /// Storage root the media directory lives in (default: the file's directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Media directory relative to the root
    #[arg(long, env = "LOCALIZER_MEDIA_DIR")]
    media_dir: Option<String>,

    /// Print the rewritten document instead of saving it
    #[arg(long)]
    stdout: bool,

    /// Print Prometheus metrics when done
    #[arg(long)]
    metrics: bool,

    /// References downloaded at the same time
    #[arg(long, default_value_t = image_localizer::document::DEFAULT_CONCURRENCY)]
    concurrency: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = LocalizerConfig::from_env()?;
    if let Some(media_dir) = args.media_dir {
        config.media.directory = media_dir;
        config.validate()?;
    }

    init_logging(&config);

    let root = match args.root {
        Some(root) => root,
        None => args
            .file
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let text = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let adapter = Arc::new(DiskAdapter::new(root));
    let fetcher = Arc::new(HttpFetcher::new(&config.fetch)?);
    let pipeline = IngestionPipeline::new(config.media.clone(), adapter, fetcher);
    let rewriter = DocumentRewriter::new(pipeline).with_concurrency(args.concurrency);

    let report = rewriter.rewrite(&text).await;

    if args.stdout {
        print!("{}", report.text);
    } else if report.text != text {
        tokio::fs::write(&args.file, &report.text)
            .await
            .with_context(|| format!("Failed to write {}", args.file.display()))?;
        tracing::info!("Updated {}", args.file.display());
    } else {
        tracing::info!("Nothing to change in {}", args.file.display());
    }

    if args.metrics {
        eprint!("{}", metrics::render_metrics());
    }

    Ok(())
}

fn init_logging(config: &LocalizerConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("image_localizer={}", config.logging.level).into());

    // Logs go to stderr so --stdout output stays clean.
    if config.logging.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

//! Play back a directory of image frames through the prefetch buffer.
//!
//! Usage: cargo run --example image_sequence -- <frame-dir> [config.yaml]
//!
//! Set `RUST_LOG=framefetch=debug` to watch the worker lifecycle.

use anyhow::{Context, Result};
use framefetch::{FrameCapture, FrameSourceExt, ImageSequenceSource, PrefetchConfig};
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let dir = args.next().context("usage: image_sequence <frame-dir> [config.yaml]")?;
    let config = match args.next() {
        Some(path) => PrefetchConfig::from_yaml_file(&path)
            .with_context(|| format!("loading config from {path}"))?,
        None => PrefetchConfig::default(),
    };

    let interval = config.interval;
    let source = ImageSequenceSource::open(&dir)
        .await
        .with_context(|| format!("opening frame directory {dir}"))?
        .step_by(interval);
    let mut capture = FrameCapture::open(source, config)?;
    info!("Playing {:?} frames from {}", capture.source_len(), dir);

    let started = Instant::now();
    let mut bytes = 0usize;
    while let Some(frame) = capture.read().await? {
        bytes += frame.data.len();
        info!(
            count = capture.count(),
            position = capture.frame_index(),
            buffered = capture.buffered(),
            "{}",
            frame.path.display()
        );
        // Stand-in for per-frame consumer work
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    info!("Read {} bytes in {:?}", bytes, started.elapsed());
    capture.stop().await?;
    Ok(())
}

//! Synchronous capture facade

use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use super::FrameCapture;
use crate::source::FrameSource;
use crate::types::PrefetchConfig;
use crate::{CaptureError, Result};

/// Blocking wrapper around [`FrameCapture`]
///
/// Owns a dedicated runtime with one worker thread, so the prefetch worker keeps decoding
/// between calls to [`read`](Self::read). Intended for synchronous consumers; calling any
/// method from inside an async context panics.
///
/// ```rust
/// use framefetch::{BlockingCapture, MemorySource, PrefetchConfig};
///
/// let source = MemorySource::new(vec![10, 20, 30]);
/// let mut capture = BlockingCapture::open(source, PrefetchConfig::new(2)).unwrap();
///
/// let mut frames = Vec::new();
/// while let Some(frame) = capture.read().unwrap() {
///     frames.push(frame);
/// }
/// assert_eq!(frames, vec![10, 20, 30]);
/// assert_eq!(capture.count(), 3);
///
/// capture.release().unwrap();
/// ```
pub struct BlockingCapture<S: FrameSource> {
    // Dropped before the runtime so the worker is cancelled while the runtime still runs
    inner: FrameCapture<S>,
    runtime: Runtime,
}

impl<S: FrameSource> BlockingCapture<S> {
    /// Create a capture and start its worker on a dedicated runtime
    pub fn open(source: S, config: PrefetchConfig) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("framefetch-prefetch")
            .enable_all()
            .build()
            .map_err(|source| CaptureError::Runtime { source })?;

        let mut inner = FrameCapture::new(source, config)?;
        {
            let _guard = runtime.enter();
            inner.start()?;
        }

        Ok(Self { inner, runtime })
    }

    /// Read the next frame, blocking until one is available.
    ///
    /// See [`FrameCapture::read`].
    pub fn read(&mut self) -> Result<Option<S::Frame>> {
        self.runtime.block_on(self.inner.read())
    }

    /// Stop the worker, join it and release the source.
    ///
    /// See [`FrameCapture::stop`].
    pub fn release(&mut self) -> Result<()> {
        debug!("Releasing blocking capture");
        self.runtime.block_on(self.inner.stop())
    }

    /// Cumulative frame count
    pub fn count(&self) -> u64 {
        self.inner.count()
    }

    /// Last known source position
    pub fn frame_index(&self) -> u64 {
        self.inner.frame_index()
    }

    /// Number of envelopes currently buffered ahead of the consumer
    pub fn buffered(&self) -> usize {
        self.inner.buffered()
    }

    /// Total number of frames in the source, if known
    pub fn source_len(&self) -> Option<u64> {
        self.inner.source_len()
    }

    /// Whether the terminal envelope has been read
    pub fn is_ended(&self) -> bool {
        self.inner.is_ended()
    }
}

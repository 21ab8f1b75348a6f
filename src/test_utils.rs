//! Test utilities: instrumented frame sources
//!
//! These sources are shared by the unit tests, the integration tests and the benchmarks.
//! Each one exposes its counters through a cloneable [`SourceCounters`] handle so a test
//! can observe how far the prefetch worker has run ahead of the consumer.

#![cfg(any(test, feature = "benchmark"))]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crate::source::{FrameSource, SequentialDecoder};
use crate::{CaptureError, Result};

/// Shared counters for an instrumented source
#[derive(Debug, Default)]
pub struct SourceCounters {
    produced: AtomicU64,
    released: AtomicBool,
    dropped: AtomicBool,
}

impl SourceCounters {
    /// Number of frames handed out by the source
    pub fn produced(&self) -> u64 {
        self.produced.load(Ordering::SeqCst)
    }

    /// Whether `release()` has been called
    pub fn released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Whether the source value has been dropped
    pub fn dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }

    /// Wait until the source has produced at least `frames` frames
    ///
    /// Panics after five seconds so a stuck worker fails the test instead of hanging it.
    pub async fn wait_for_produced(&self, frames: u64) {
        let waited = tokio::time::timeout(Duration::from_secs(5), async {
            while self.produced() < frames {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await;
        assert!(waited.is_ok(), "source produced {} of {} frames", self.produced(), frames);
    }

    /// Wait until the source value has been dropped
    pub async fn wait_for_drop(&self) {
        let waited = tokio::time::timeout(Duration::from_secs(5), async {
            while !self.dropped() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await;
        assert!(waited.is_ok(), "source was never dropped");
    }
}

/// Source yielding `0, 1, 2, ...` as frames
///
/// Optionally stops after a fixed number of frames, either by reporting exhaustion or by
/// failing with a source error.
#[derive(Debug)]
pub struct CountingSource {
    limit: Option<u64>,
    fail_at_limit: bool,
    delay: Option<Duration>,
    position: u64,
    counters: Arc<SourceCounters>,
}

impl CountingSource {
    /// Yields `frames` frames, then reports exhaustion
    pub fn finite(frames: u64) -> Self {
        Self::build(Some(frames), false)
    }

    /// Never runs out of frames
    pub fn infinite() -> Self {
        Self::build(None, false)
    }

    /// Yields `frames` frames, then fails with a source error
    pub fn failing_after(frames: u64) -> Self {
        Self::build(Some(frames), true)
    }

    /// Sleep for `delay` before every read, simulating decode latency
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Handle to the source's counters
    pub fn counters(&self) -> Arc<SourceCounters> {
        Arc::clone(&self.counters)
    }

    fn build(limit: Option<u64>, fail_at_limit: bool) -> Self {
        Self {
            limit,
            fail_at_limit,
            delay: None,
            position: 0,
            counters: Arc::new(SourceCounters::default()),
        }
    }
}

#[async_trait::async_trait]
impl FrameSource for CountingSource {
    type Frame = u64;

    async fn read_next(&mut self) -> Result<Option<u64>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.limit.is_some_and(|limit| self.position >= limit) {
            if self.fail_at_limit {
                return Err(CaptureError::source_failed(format!(
                    "decode error at frame {}",
                    self.position
                )));
            }
            return Ok(None);
        }

        let frame = self.position;
        self.position += 1;
        self.counters.produced.fetch_add(1, Ordering::SeqCst);
        Ok(Some(frame))
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn frame_count_hint(&self) -> Option<u64> {
        self.limit
    }

    async fn release(&mut self) -> Result<()> {
        self.counters.released.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for CountingSource {
    fn drop(&mut self) {
        self.counters.dropped.store(true, Ordering::SeqCst);
    }
}

/// Source whose reads never complete
#[derive(Debug, Default)]
pub struct PendingSource {
    counters: Arc<SourceCounters>,
}

impl PendingSource {
    /// Handle to the source's counters
    pub fn counters(&self) -> Arc<SourceCounters> {
        Arc::clone(&self.counters)
    }
}

#[async_trait::async_trait]
impl FrameSource for PendingSource {
    type Frame = u64;

    async fn read_next(&mut self) -> Result<Option<u64>> {
        std::future::pending().await
    }

    fn position(&self) -> u64 {
        0
    }

    async fn release(&mut self) -> Result<()> {
        self.counters.released.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for PendingSource {
    fn drop(&mut self) {
        self.counters.dropped.store(true, Ordering::SeqCst);
    }
}

/// Blocking decoder yielding `0, 1, 2, ...` up to a limit
#[derive(Debug)]
pub struct CountingDecoder {
    limit: u64,
    delay: Option<Duration>,
    position: u64,
    counters: Arc<SourceCounters>,
}

impl CountingDecoder {
    /// Decodes `frames` frames, then reports exhaustion
    pub fn new(frames: u64) -> Self {
        Self { limit: frames, delay: None, position: 0, counters: Arc::default() }
    }

    /// Block the calling thread for `delay` on every decode
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Handle to the decoder's counters
    pub fn counters(&self) -> Arc<SourceCounters> {
        Arc::clone(&self.counters)
    }
}

impl SequentialDecoder for CountingDecoder {
    type Frame = u64;

    fn decode_next(&mut self) -> Result<Option<u64>> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.position >= self.limit {
            return Ok(None);
        }
        let frame = self.position;
        self.position += 1;
        self.counters.produced.fetch_add(1, Ordering::SeqCst);
        Ok(Some(frame))
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn frame_count_hint(&self) -> Option<u64> {
        Some(self.limit)
    }

    fn release(&mut self) -> Result<()> {
        self.counters.released.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for CountingDecoder {
    fn drop(&mut self) {
        self.counters.dropped.store(true, Ordering::SeqCst);
    }
}

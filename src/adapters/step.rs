//! Frame skipping adapter

use tracing::trace;

use crate::Result;
use crate::source::FrameSource;

/// Source adapter returning one frame out of every `step`
///
/// The first frame is returned as-is; before each later frame, `step - 1` frames are read
/// from the inner source and discarded. Position is the inner source's position.
pub struct StepBy<S> {
    inner: S,
    step: u64,
    started: bool,
}

impl<S: FrameSource> StepBy<S> {
    /// Create a new stepping adapter
    ///
    /// # Panics
    ///
    /// Panics if `step` is zero.
    pub fn new(inner: S, step: u64) -> Self {
        assert!(step > 0, "step must be at least 1");
        Self { inner, step, started: false }
    }

    /// Get a reference to the wrapped source
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Unwrap the adapter
    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait::async_trait]
impl<S: FrameSource> FrameSource for StepBy<S> {
    type Frame = S::Frame;

    async fn read_next(&mut self) -> Result<Option<S::Frame>> {
        if self.started {
            for _ in 1..self.step {
                if self.inner.read_next().await?.is_none() {
                    return Ok(None);
                }
            }
            trace!("Skipped {} frames, position {}", self.step - 1, self.inner.position());
        }
        self.started = true;
        self.inner.read_next().await
    }

    fn position(&self) -> u64 {
        self.inner.position()
    }

    fn frame_count_hint(&self) -> Option<u64> {
        self.inner.frame_count_hint().map(|total| total.div_ceil(self.step))
    }

    async fn release(&mut self) -> Result<()> {
        self.inner.release().await
    }
}

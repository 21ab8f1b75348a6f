//! Per-frame preprocessing adapter

use crate::Result;
use crate::source::FrameSource;

/// Source adapter applying a fallible transform to every frame
///
/// This is where per-frame corrections such as lens undistortion belong: the transform runs
/// on the prefetch worker, so its cost is hidden behind the lookahead together with
/// decoding. A transform error is reported like any other source failure.
pub struct MapFrames<S, M> {
    inner: S,
    map: M,
}

impl<S, M> MapFrames<S, M> {
    /// Create a new mapping adapter
    pub fn new(inner: S, map: M) -> Self {
        Self { inner, map }
    }

    /// Unwrap the adapter
    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait::async_trait]
impl<S, M, T> FrameSource for MapFrames<S, M>
where
    S: FrameSource,
    M: FnMut(S::Frame) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    type Frame = T;

    async fn read_next(&mut self) -> Result<Option<T>> {
        match self.inner.read_next().await? {
            Some(frame) => (self.map)(frame).map(Some),
            None => Ok(None),
        }
    }

    fn position(&self) -> u64 {
        self.inner.position()
    }

    fn frame_count_hint(&self) -> Option<u64> {
        self.inner.frame_count_hint()
    }

    async fn release(&mut self) -> Result<()> {
        self.inner.release().await
    }
}

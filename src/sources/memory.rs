//! In-memory frame source

use std::collections::VecDeque;

use crate::Result;
use crate::source::FrameSource;

/// Source that hands out frames from memory, in order
#[derive(Debug, Clone)]
pub struct MemorySource<F> {
    frames: VecDeque<F>,
    total: u64,
    position: u64,
}

impl<F> MemorySource<F> {
    /// Create a source over `frames`
    pub fn new(frames: impl IntoIterator<Item = F>) -> Self {
        let frames: VecDeque<F> = frames.into_iter().collect();
        let total = frames.len() as u64;
        Self { frames, total, position: 0 }
    }

    /// Number of frames not yet handed out
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

#[async_trait::async_trait]
impl<F: Send + 'static> FrameSource for MemorySource<F> {
    type Frame = F;

    async fn read_next(&mut self) -> Result<Option<F>> {
        let frame = self.frames.pop_front();
        if frame.is_some() {
            self.position += 1;
        }
        Ok(frame)
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn frame_count_hint(&self) -> Option<u64> {
        Some(self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hands_out_frames_then_exhausts() {
        let mut source = MemorySource::new(["a", "b"]);
        assert_eq!(source.frame_count_hint(), Some(2));

        assert_eq!(source.read_next().await.unwrap(), Some("a"));
        assert_eq!(source.position(), 1);
        assert_eq!(source.read_next().await.unwrap(), Some("b"));
        assert_eq!(source.read_next().await.unwrap(), None);
        assert_eq!(source.position(), 2);
        assert_eq!(source.remaining(), 0);
    }
}

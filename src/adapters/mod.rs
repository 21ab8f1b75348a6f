//! Source adapters
//!
//! Extension methods for composing frame sources before handing them to a capture:
//! frame skipping with [`FrameSourceExt::step_by`] and per-frame preprocessing with
//! [`FrameSourceExt::map_frames`].
//!
//! ```rust
//! use framefetch::{FrameCapture, FrameSourceExt, MemorySource, PrefetchConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> framefetch::Result<()> {
//!     // Every second frame, counted in steps of two
//!     let source = MemorySource::new(0..6u32).step_by(2).map_frames(|frame| Ok(frame * 100));
//!     let config = PrefetchConfig::new(2).with_interval(2);
//!     let mut capture = FrameCapture::open(source, config)?;
//!
//!     assert_eq!(capture.read().await?, Some(0));
//!     assert_eq!(capture.read().await?, Some(200));
//!     assert_eq!(capture.count(), 4);
//!     capture.stop().await
//! }
//! ```

mod map;
mod step;

pub use map::MapFrames;
pub use step::StepBy;

use crate::Result;
use crate::source::FrameSource;

/// Extension trait adding adapters to any [`FrameSource`]
pub trait FrameSourceExt: FrameSource {
    /// Return one frame out of every `step`
    fn step_by(self, step: u64) -> StepBy<Self>
    where
        Self: Sized,
    {
        StepBy::new(self, step)
    }

    /// Apply `map` to every frame on the prefetch worker
    fn map_frames<M, T>(self, map: M) -> MapFrames<Self, M>
    where
        Self: Sized,
        M: FnMut(Self::Frame) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        MapFrames::new(self, map)
    }
}

impl<T: FrameSource> FrameSourceExt for T {}

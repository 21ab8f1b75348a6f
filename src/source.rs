//! Frame source traits

use crate::Result;

/// Trait for sequential frame sources
///
/// A source hands out one decoded frame per call, strictly in order. Sources abstract
/// over video decoders, image sequences, camera handles and anything else that produces
/// frames one at a time. They are driven exclusively by the prefetch worker once a
/// capture has been started.
#[async_trait::async_trait]
pub trait FrameSource: Send + 'static {
    /// Decoded frame payload
    type Frame: Send + 'static;

    /// Read the next frame
    ///
    /// Returns:
    /// - `Ok(Some(frame))` - New frame available
    /// - `Ok(None)` - Source exhausted (permanent, the source is not read again)
    /// - `Err(e)` - Failure other than exhaustion; delivered to the consumer and ends the stream
    ///
    /// The returned future may be dropped before completion when the capture is stopped.
    async fn read_next(&mut self) -> Result<Option<Self::Frame>>;

    /// The source's own notion of position, typically the number of frames consumed so far
    fn position(&self) -> u64;

    /// Total number of frames, when the source knows it up front
    fn frame_count_hint(&self) -> Option<u64> {
        None
    }

    /// Release any underlying resources
    ///
    /// Called once, after the prefetch worker has fully exited.
    async fn release(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Synchronous counterpart of [`FrameSource`] for blocking decoders
///
/// Wrap an implementation in [`DecoderSource`](crate::sources::DecoderSource) to drive it
/// from the prefetch worker without stalling the async runtime.
pub trait SequentialDecoder: Send + 'static {
    /// Decoded frame payload
    type Frame: Send + 'static;

    /// Decode the next frame, blocking the calling thread
    fn decode_next(&mut self) -> Result<Option<Self::Frame>>;

    /// Number of frames consumed from the underlying media so far
    fn position(&self) -> u64;

    /// Total number of frames, when known
    fn frame_count_hint(&self) -> Option<u64> {
        None
    }

    /// Release the decoder handle
    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}

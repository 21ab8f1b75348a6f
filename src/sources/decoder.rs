//! Adapter running blocking decoders on the blocking thread pool

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::source::{FrameSource, SequentialDecoder};
use crate::{CaptureError, Result};

/// Decoder plus the outcome of the decode it just ran, handed back by the blocking thread
type DecodeTask<D> = JoinHandle<(D, Result<Option<<D as SequentialDecoder>::Frame>>)>;

/// [`FrameSource`] driving a [`SequentialDecoder`] via `spawn_blocking`
///
/// Each decode moves the decoder onto a blocking thread and back. The in-flight decode is kept
/// as a task handle, so a read abandoned by a stopping capture does not lose the decoder:
/// the next [`read_next`](FrameSource::read_next) resumes waiting on the same decode, and
/// [`release`](FrameSource::release) waits for it to finish before releasing the decoder.
pub struct DecoderSource<D: SequentialDecoder> {
    decoder: Option<D>,
    pending: Option<DecodeTask<D>>,
    position: u64,
    frame_count: Option<u64>,
}

impl<D: SequentialDecoder> DecoderSource<D> {
    /// Wrap a blocking decoder
    pub fn new(decoder: D) -> Self {
        let position = decoder.position();
        let frame_count = decoder.frame_count_hint();
        Self { decoder: Some(decoder), pending: None, position, frame_count }
    }

    /// Take the decoder back from a finished decode task
    fn restore(&mut self, decoder: D) {
        self.position = decoder.position();
        self.decoder = Some(decoder);
    }
}

#[async_trait::async_trait]
impl<D: SequentialDecoder> FrameSource for DecoderSource<D> {
    type Frame = D::Frame;

    async fn read_next(&mut self) -> Result<Option<D::Frame>> {
        if self.pending.is_none() {
            let mut decoder = self
                .decoder
                .take()
                .ok_or_else(|| CaptureError::source_failed("decoder lost by a panicked decode"))?;
            self.pending = Some(tokio::task::spawn_blocking(move || {
                let result = decoder.decode_next();
                (decoder, result)
            }));
        }
        let Some(task) = self.pending.as_mut() else {
            return Err(CaptureError::source_failed("decode task missing"));
        };

        // Cancellation safe: dropping this future leaves the task in `pending`
        let joined = task.await;
        self.pending = None;

        let (decoder, result) = joined?;
        self.restore(decoder);
        result
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn frame_count_hint(&self) -> Option<u64> {
        self.frame_count
    }

    async fn release(&mut self) -> Result<()> {
        if let Some(task) = self.pending.take() {
            debug!("Waiting for in-flight decode before release");
            let (decoder, _abandoned) = task.await?;
            self.restore(decoder);
        }

        match self.decoder.take() {
            Some(mut decoder) => {
                tokio::task::spawn_blocking(move || decoder.release()).await?
            }
            None => {
                debug!("Decoder already lost by a panicked decode");
                Ok(())
            }
        }
    }
}

impl<D: SequentialDecoder> Drop for DecoderSource<D> {
    fn drop(&mut self) {
        if self.decoder.is_some() || self.pending.is_some() {
            warn!("Decoder source dropped without release");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::CountingDecoder;
    use crate::{FrameCapture, PrefetchConfig};
    use std::time::Duration;

    #[tokio::test]
    async fn decodes_in_order_and_releases() {
        let decoder = CountingDecoder::new(3);
        let counters = decoder.counters();
        let mut capture =
            FrameCapture::open(DecoderSource::new(decoder), PrefetchConfig::new(2)).unwrap();
        assert_eq!(capture.source_len(), Some(3));

        let mut frames = Vec::new();
        while let Some(frame) = capture.read().await.unwrap() {
            frames.push(frame);
        }
        assert_eq!(frames, vec![0, 1, 2]);
        assert_eq!(capture.frame_index(), 3);

        capture.stop().await.unwrap();
        assert!(counters.released());
    }

    #[tokio::test]
    async fn stop_during_slow_decode_releases_decoder() {
        let decoder = CountingDecoder::new(1000).with_delay(Duration::from_millis(200));
        let counters = decoder.counters();
        let mut capture =
            FrameCapture::open(DecoderSource::new(decoder), PrefetchConfig::new(1)).unwrap();

        tokio::time::sleep(Duration::from_millis(10)).await;
        tokio::time::timeout(Duration::from_secs(5), capture.stop())
            .await
            .expect("stop must return after the in-flight decode")
            .unwrap();

        // The in-flight decode was awaited, so the decoder is released before stop returns
        assert!(counters.released());
    }

    #[tokio::test]
    async fn abandoned_read_resumes_same_decode() {
        let decoder = CountingDecoder::new(3).with_delay(Duration::from_millis(50));
        let counters = decoder.counters();
        let mut source = DecoderSource::new(decoder);

        let abandoned = tokio::time::timeout(Duration::from_millis(5), source.read_next()).await;
        assert!(abandoned.is_err());

        assert_eq!(source.read_next().await.unwrap(), Some(0));
        assert_eq!(source.position(), 1);
        assert_eq!(source.read_next().await.unwrap(), Some(1));
        assert_eq!(counters.produced(), 2);

        source.release().await.unwrap();
        assert!(counters.released());
    }

    #[tokio::test]
    async fn release_waits_for_abandoned_read() {
        let decoder = CountingDecoder::new(3).with_delay(Duration::from_millis(50));
        let counters = decoder.counters();
        let mut source = DecoderSource::new(decoder);

        let abandoned = tokio::time::timeout(Duration::from_millis(5), source.read_next()).await;
        assert!(abandoned.is_err());
        assert!(!counters.released());

        source.release().await.unwrap();
        assert!(counters.released());
        assert_eq!(source.position(), 1);
    }
}

//! Prefetching frame capture
//!
//! [`FrameCapture`] owns the background prefetch worker and is the consumer side of the
//! envelope buffer. It is single-use: once stopped, or once end-of-stream has been read,
//! it cannot be restarted.

mod blocking;
mod sequence;

pub use blocking::BlockingCapture;
pub use sequence::SequenceTracker;

use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::driver::Driver;
use crate::source::FrameSource;
use crate::types::{Envelope, PrefetchConfig};
use crate::{CaptureError, Result};

enum Lifecycle<S: FrameSource> {
    /// Constructed, worker not yet spawned
    Idle(S),

    /// Worker spawned; the source lives inside the worker
    Running {
        envelopes: mpsc::Receiver<Envelope<S::Frame>>,
        worker: JoinHandle<S>,
        cancel: CancellationToken,
    },

    /// Worker joined and source released
    Stopped,
}

/// Frame capture with bounded lookahead
///
/// A background worker reads frames from the source ahead of the consumer and keeps up to
/// `buffer_size` of them ready. [`read`](Self::read) hands them out strictly in order.
///
/// ```rust
/// use framefetch::{FrameCapture, MemorySource, PrefetchConfig};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> framefetch::Result<()> {
///     let source = MemorySource::new(vec!["a", "b", "c"]);
///     let mut capture = FrameCapture::open(source, PrefetchConfig::new(2))?;
///
///     while let Some(frame) = capture.read().await? {
///         println!("frame {} at position {}: {}", capture.count(), capture.frame_index(), frame);
///     }
///
///     capture.stop().await
/// }
/// ```
pub struct FrameCapture<S: FrameSource> {
    /// Worker state
    lifecycle: Lifecycle<S>,

    /// Configuration fixed at construction
    config: PrefetchConfig,

    /// Cumulative frame count
    sequence: SequenceTracker,

    /// Last known source position
    frame_index: u64,

    /// Total frames reported by the source, if known
    source_len: Option<u64>,

    /// Set once a terminal envelope has been read
    ended: bool,
}

impl<S: FrameSource> FrameCapture<S> {
    /// Create a capture bound to `source` without starting the worker
    pub fn new(source: S, config: PrefetchConfig) -> Result<Self> {
        config.validate()?;

        let source_len = source.frame_count_hint();
        let frame_index = source.position();

        Ok(Self {
            lifecycle: Lifecycle::Idle(source),
            config,
            sequence: SequenceTracker::new(config.initial_offset, config.interval),
            frame_index,
            source_len,
            ended: false,
        })
    }

    /// Create a capture and start its worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(source: S, config: PrefetchConfig) -> Result<Self> {
        let mut capture = Self::new(source, config)?;
        capture.start()?;
        Ok(capture)
    }

    /// Spawn the prefetch worker.
    ///
    /// Must be called from within a tokio runtime, at most once per capture.
    pub fn start(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.lifecycle, Lifecycle::Stopped) {
            Lifecycle::Idle(source) => {
                info!(
                    buffer_size = self.config.buffer_size,
                    interval = self.config.interval,
                    initial_offset = self.config.initial_offset,
                    "Starting prefetch worker"
                );
                let channels = Driver::spawn(source, &self.config);
                self.lifecycle = Lifecycle::Running {
                    envelopes: channels.envelopes,
                    worker: channels.worker,
                    cancel: channels.cancel,
                };
                Ok(())
            }
            running @ Lifecycle::Running { .. } => {
                self.lifecycle = running;
                Err(CaptureError::AlreadyStarted)
            }
            Lifecycle::Stopped => Err(CaptureError::Stopped),
        }
    }

    /// Read the next frame, waiting until the worker has produced one.
    ///
    /// Returns:
    /// - `Ok(Some(frame))` - next frame in order
    /// - `Ok(None)` - end of stream; later calls return [`CaptureError::StreamEnded`]
    /// - `Err(e)` - the source failed, or the capture is not in a readable state
    ///
    /// # Panics
    ///
    /// Panics if a frame arrives out of sequence.
    pub async fn read(&mut self) -> Result<Option<S::Frame>> {
        let envelopes = match &mut self.lifecycle {
            Lifecycle::Running { envelopes, .. } => envelopes,
            Lifecycle::Idle(_) => return Err(CaptureError::NotStarted),
            Lifecycle::Stopped => return Err(CaptureError::Stopped),
        };

        if self.ended {
            return Err(CaptureError::StreamEnded);
        }

        match envelopes.recv().await {
            Some(Envelope::Frame(frame)) => {
                self.sequence.accept(frame.sequence);
                self.frame_index = frame.position;
                trace!("Read frame: count={}, position={}", frame.sequence, frame.position);
                Ok(Some(frame.payload))
            }
            Some(Envelope::End { position }) => {
                debug!("End of stream at position {}", position);
                self.ended = true;
                self.frame_index = position;
                Ok(None)
            }
            Some(Envelope::Failed { position, error }) => {
                debug!("Source failure delivered at position {}", position);
                self.ended = true;
                self.frame_index = position;
                Err(error)
            }
            None => {
                self.ended = true;
                Err(CaptureError::worker_exited("envelope channel closed"))
            }
        }
    }

    /// Stop the worker, wait for it to exit, then release the source.
    ///
    /// Safe to call at any point: before start, mid-stream with a full buffer, or after
    /// end-of-stream. Calling it again after a successful stop is a no-op.
    pub async fn stop(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.lifecycle, Lifecycle::Stopped) {
            Lifecycle::Idle(mut source) => {
                debug!("Releasing source of a capture that was never started");
                source.release().await
            }
            Lifecycle::Running { envelopes, worker, cancel } => {
                info!("Stopping prefetch worker");
                cancel.cancel();
                // Closing the receiver also fails any send the worker is parked on
                drop(envelopes);

                let mut source = worker.await?;
                info!(count = self.count(), "Prefetch worker joined, releasing source");
                source.release().await
            }
            Lifecycle::Stopped => {
                debug!("Capture already stopped");
                Ok(())
            }
        }
    }

    /// Convert the capture into a stream of frames.
    ///
    /// The stream ends after end-of-stream or after yielding a source error. Dropping the
    /// stream cancels the worker without releasing the source.
    pub fn into_stream(self) -> impl Stream<Item = Result<S::Frame>> + Send + 'static {
        futures::stream::unfold(self, |mut capture| async move {
            if capture.is_ended() {
                return None;
            }
            match capture.read().await {
                Ok(Some(frame)) => Some((Ok(frame), capture)),
                Ok(None) => None,
                Err(error) => {
                    capture.ended = true;
                    Some((Err(error), capture))
                }
            }
        })
    }

    /// Cumulative frame count: `initial_offset + frames_read * interval`
    pub fn count(&self) -> u64 {
        self.sequence.count()
    }

    /// Last known source position
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Number of envelopes currently buffered ahead of the consumer
    pub fn buffered(&self) -> usize {
        match &self.lifecycle {
            Lifecycle::Running { envelopes, .. } => envelopes.len(),
            Lifecycle::Idle(_) | Lifecycle::Stopped => 0,
        }
    }

    /// Total number of frames in the source, if known
    pub fn source_len(&self) -> Option<u64> {
        self.source_len
    }

    /// Configuration the capture was built with
    pub fn config(&self) -> &PrefetchConfig {
        &self.config
    }

    /// Whether the terminal envelope has been read
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Whether the worker has been spawned and not yet stopped
    pub fn is_running(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Running { .. })
    }
}

impl<S: FrameSource> Drop for FrameCapture<S> {
    fn drop(&mut self) {
        if let Lifecycle::Running { cancel, .. } = &self.lifecycle {
            debug!("Dropping running capture, cancelling prefetch worker");
            cancel.cancel();
        }
    }
}

//! Driver spawns and manages the prefetch production task

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::CaptureError;
use crate::source::FrameSource;
use crate::types::{Envelope, FrameEnvelope, PrefetchConfig};

/// Result of spawning the production task
pub struct DriverChannels<S: FrameSource> {
    /// Receiver for envelopes, in production order
    pub envelopes: mpsc::Receiver<Envelope<S::Frame>>,
    /// Handle resolving to the source once the task has exited
    pub worker: JoinHandle<S>,
    /// Cancellation token for stopping the task
    pub cancel: CancellationToken,
}

/// Driver spawns and manages the prefetch production task
///
/// The spawned task owns the source for its whole lifetime and hands it back through
/// its join handle, so the source is never touched concurrently with the task.
pub struct Driver;

impl Driver {
    /// Spawn the production task for the given source
    ///
    /// Must be called from within a tokio runtime. The envelope channel holds at most
    /// `config.buffer_size` envelopes.
    pub fn spawn<S>(source: S, config: &PrefetchConfig) -> DriverChannels<S>
    where
        S: FrameSource,
    {
        let (envelope_tx, envelope_rx) = mpsc::channel(config.buffer_size);
        let cancel = CancellationToken::new();

        let cancel_worker = cancel.clone();
        let config = *config;
        let worker = tokio::spawn(async move {
            Self::production_loop(source, envelope_tx, config, cancel_worker).await
        });

        DriverChannels { envelopes: envelope_rx, worker, cancel }
    }

    /// Production loop - reads frames and enqueues them until exhaustion or cancellation
    async fn production_loop<S>(
        mut source: S,
        envelope_tx: mpsc::Sender<Envelope<S::Frame>>,
        config: PrefetchConfig,
        cancel: CancellationToken,
    ) -> S
    where
        S: FrameSource,
    {
        info!(buffer_size = config.buffer_size, "Prefetch worker started");
        let mut sequence = config.initial_offset;
        let mut produced = 0u64;

        loop {
            if cancel.is_cancelled() {
                info!("Prefetch worker cancelled");
                break;
            }

            // A slow or stuck source must not hold up cancellation
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Prefetch worker cancelled during read");
                    break;
                }
                result = source.read_next() => result,
            };

            let envelope = match result {
                Ok(Some(payload)) => match sequence.checked_add(config.interval) {
                    Some(next) => {
                        sequence = next;
                        produced += 1;
                        let position = source.position();
                        trace!("Frame {}: sequence={}, position={}", produced, sequence, position);
                        Envelope::Frame(FrameEnvelope { sequence, position, payload })
                    }
                    None => {
                        warn!("Frame counter overflowed after {} frames at {}", produced, sequence);
                        Envelope::Failed {
                            position: source.position(),
                            error: CaptureError::SequenceOverflow {
                                last: sequence,
                                interval: config.interval,
                            },
                        }
                    }
                },
                Ok(None) => {
                    info!("Frame source exhausted after {} frames", produced);
                    Envelope::End { position: source.position() }
                }
                Err(error) => {
                    warn!("Frame source failed after {} frames: {}", produced, error);
                    Envelope::Failed { position: source.position(), error }
                }
            };
            let terminal = envelope.is_terminal();

            // The send waits while the buffer is full; cancellation wins over a free slot
            let delivered = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Prefetch worker cancelled while buffer full");
                    break;
                }
                sent = envelope_tx.send(envelope) => sent.is_ok(),
            };

            if !delivered {
                debug!("Envelope receiver dropped, shutting down");
                break;
            }
            if terminal {
                break;
            }
        }

        info!("Prefetch worker ended (produced {} frames)", produced);
        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{CountingSource, PendingSource};
    use std::time::Duration;

    #[tokio::test]
    async fn frames_arrive_in_order_followed_by_single_end() {
        let config = PrefetchConfig::new(2).with_initial_offset(10).with_interval(5);
        let mut channels = Driver::spawn(CountingSource::finite(3), &config);

        let mut sequences = Vec::new();
        while let Some(envelope) = channels.envelopes.recv().await {
            match envelope {
                Envelope::Frame(frame) => sequences.push((frame.sequence, frame.payload)),
                Envelope::End { position } => {
                    assert_eq!(position, 3);
                    break;
                }
                Envelope::Failed { error, .. } => panic!("unexpected failure: {error}"),
            }
        }

        assert_eq!(sequences, vec![(15, 0), (20, 1), (25, 2)]);
        // Nothing follows the terminal envelope
        assert!(channels.envelopes.recv().await.is_none());
        let source = channels.worker.await.expect("worker should exit cleanly");
        assert_eq!(source.position(), 3);
    }

    #[tokio::test]
    async fn source_failure_is_sent_as_terminal_envelope() {
        let config = PrefetchConfig::new(4);
        let mut channels = Driver::spawn(CountingSource::failing_after(2), &config);

        let mut frames = 0;
        let mut failures = 0;
        while let Some(envelope) = channels.envelopes.recv().await {
            match envelope {
                Envelope::Frame(_) => frames += 1,
                Envelope::Failed { position, .. } => {
                    assert_eq!(position, 2);
                    failures += 1;
                }
                Envelope::End { .. } => panic!("failure must not be reported as exhaustion"),
            }
        }

        assert_eq!(frames, 2);
        assert_eq!(failures, 1);
        channels.worker.await.expect("worker should exit cleanly");
    }

    #[tokio::test]
    async fn counter_overflow_ends_stream_with_failure() {
        let config = PrefetchConfig::new(4).with_initial_offset(u64::MAX - 1);
        let mut channels = Driver::spawn(CountingSource::finite(3), &config);

        match channels.envelopes.recv().await {
            Some(Envelope::Frame(frame)) => assert_eq!(frame.sequence, u64::MAX),
            other => panic!("expected a frame, got {other:?}"),
        }
        match channels.envelopes.recv().await {
            Some(Envelope::Failed { position, error }) => {
                assert_eq!(position, 2);
                assert!(matches!(
                    error,
                    CaptureError::SequenceOverflow { last: u64::MAX, interval: 1 }
                ));
            }
            other => panic!("expected overflow failure, got {other:?}"),
        }
        assert!(channels.envelopes.recv().await.is_none());
        channels.worker.await.expect("worker should exit cleanly");
    }

    #[tokio::test]
    async fn cancel_releases_worker_blocked_on_full_buffer() {
        let source = CountingSource::infinite();
        let counters = source.counters();
        let channels = Driver::spawn(source, &PrefetchConfig::new(2));

        // Two buffered plus one held by the blocked send
        counters.wait_for_produced(3).await;

        channels.cancel.cancel();
        let source = tokio::time::timeout(Duration::from_secs(5), channels.worker)
            .await
            .expect("worker must observe cancellation while blocked")
            .expect("worker should not panic");
        assert_eq!(source.position(), 3);
        drop(channels.envelopes);
    }

    #[tokio::test]
    async fn cancel_interrupts_pending_read() {
        let channels = Driver::spawn(PendingSource::default(), &PrefetchConfig::default());

        channels.cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), channels.worker)
            .await
            .expect("worker must observe cancellation during read")
            .expect("worker should not panic");
    }

    #[tokio::test]
    async fn dropped_receiver_stops_worker() {
        let source = CountingSource::infinite();
        let channels = Driver::spawn(source, &PrefetchConfig::new(1));

        drop(channels.envelopes);
        tokio::time::timeout(Duration::from_secs(5), channels.worker)
            .await
            .expect("worker must exit once nobody is listening")
            .expect("worker should not panic");
    }
}

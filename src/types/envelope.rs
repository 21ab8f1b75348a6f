//! Envelope types carried through the prefetch buffer

use crate::CaptureError;

/// A decoded frame together with its bookkeeping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameEnvelope<F> {
    /// Strictly increasing by the configured interval for every produced frame
    pub sequence: u64,

    /// Source-reported position at the moment the frame was produced
    pub position: u64,

    /// Decoded frame data
    pub payload: F,
}

/// Unit of data flowing from the prefetch worker to the consumer
///
/// Exactly one terminal variant ([`Envelope::End`] or [`Envelope::Failed`]) is sent per
/// stream, and nothing follows it.
#[derive(Debug)]
pub enum Envelope<F> {
    /// A real frame
    Frame(FrameEnvelope<F>),

    /// The source is exhausted
    End {
        /// Last known source position
        position: u64,
    },

    /// The source failed for a reason other than exhaustion
    Failed {
        /// Last known source position
        position: u64,
        /// Error reported by the source
        error: CaptureError,
    },
}

impl<F> Envelope<F> {
    /// Whether this envelope ends the stream
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Envelope::Frame(_))
    }

    /// Source position carried by the envelope
    pub fn position(&self) -> u64 {
        match self {
            Envelope::Frame(frame) => frame.position,
            Envelope::End { position } | Envelope::Failed { position, .. } => *position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_frames_are_non_terminal() {
        let frame = Envelope::Frame(FrameEnvelope { sequence: 1, position: 1, payload: () });
        let end: Envelope<()> = Envelope::End { position: 7 };
        let failed: Envelope<()> =
            Envelope::Failed { position: 3, error: CaptureError::source_failed("bad frame") };

        assert!(!frame.is_terminal());
        assert!(end.is_terminal());
        assert!(failed.is_terminal());

        assert_eq!(frame.position(), 1);
        assert_eq!(end.position(), 7);
        assert_eq!(failed.position(), 3);
    }
}

//! Consumer-side frame counter

use tracing::error;

/// Tracks the running frame count on the consumer side
///
/// Every accepted sequence number must be exactly one interval past the previous one.
/// Anything else means envelopes were reordered or the interval bookkeeping is broken,
/// and is treated as a bug rather than something to resynchronise from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceTracker {
    last: u64,
    interval: u64,
}

impl SequenceTracker {
    /// Start counting from `initial_offset`
    pub fn new(initial_offset: u64, interval: u64) -> Self {
        Self { last: initial_offset, interval }
    }

    /// Next sequence number the consumer expects, or `None` once the counter is exhausted
    pub fn expected(&self) -> Option<u64> {
        self.last.checked_add(self.interval)
    }

    /// Accept the next delivered sequence number
    ///
    /// # Panics
    ///
    /// Panics if `sequence` is not the expected next value.
    pub fn accept(&mut self, sequence: u64) {
        let Some(expected) = self.expected() else {
            error!("Frame sequence mismatch: counter exhausted at {}, got {}", self.last, sequence);
            panic!("frame sequence mismatch: counter exhausted at {}, got {sequence}", self.last);
        };
        if sequence != expected {
            error!("Frame sequence mismatch: expected {}, got {}", expected, sequence);
            panic!("frame sequence mismatch: expected {expected}, got {sequence}");
        }
        self.last = sequence;
    }

    /// Cumulative frame count
    pub fn count(&self) -> u64 {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_interval() {
        let mut tracker = SequenceTracker::new(100, 3);
        assert_eq!(tracker.count(), 100);

        tracker.accept(103);
        tracker.accept(106);
        assert_eq!(tracker.count(), 106);
        assert_eq!(tracker.expected(), Some(109));
    }

    #[test]
    #[should_panic(expected = "frame sequence mismatch: expected 2, got 3")]
    fn skipped_sequence_panics() {
        let mut tracker = SequenceTracker::new(0, 1);
        tracker.accept(1);
        tracker.accept(3);
    }

    #[test]
    fn counts_up_to_u64_max() {
        let mut tracker = SequenceTracker::new(u64::MAX - 4, 2);
        tracker.accept(u64::MAX - 2);
        tracker.accept(u64::MAX);
        assert_eq!(tracker.count(), u64::MAX);
        assert_eq!(tracker.expected(), None);
    }

    #[test]
    #[should_panic(expected = "frame sequence mismatch: counter exhausted")]
    fn sequence_past_exhausted_counter_panics() {
        let mut tracker = SequenceTracker::new(u64::MAX - 1, 1);
        tracker.accept(u64::MAX);
        tracker.accept(0);
    }

    #[test]
    #[should_panic(expected = "frame sequence mismatch")]
    fn repeated_sequence_panics() {
        let mut tracker = SequenceTracker::new(0, 2);
        tracker.accept(2);
        tracker.accept(2);
    }
}

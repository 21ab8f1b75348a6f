//! Core types for the prefetch buffer.
//!
//! - [`Envelope`] is the unit carried from the prefetch worker to the consumer: either a
//!   real frame ([`FrameEnvelope`]) or one of the two terminal markers
//! - [`PrefetchConfig`] fixes the counter offset, counter step and buffer capacity

mod config;
mod envelope;

pub use config::PrefetchConfig;
pub use envelope::{Envelope, FrameEnvelope};

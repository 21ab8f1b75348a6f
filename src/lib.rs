//! Bounded lookahead frame prefetching over sequential frame sources.
//!
//! framefetch hides the latency of sequential, blocking frame decoding behind a fixed-depth
//! lookahead. A background worker reads frames from a [`FrameSource`] into a bounded buffer
//! while the consumer drains it at its own pace.
//!
//! # Features
//!
//! - **Strict ordering**: frames are delivered exactly in decode order, checked by sequence number
//! - **Backpressure**: the worker never runs more than `buffer_size` frames ahead
//! - **Clean shutdown**: [`FrameCapture::stop`] never hangs, even while the worker is parked on
//!   a full buffer or inside a slow decode, and releases the source only after the worker exits
//! - **Async and blocking**: [`FrameCapture`] for tokio applications, [`BlockingCapture`] for
//!   synchronous consumers
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use framefetch::{FrameCapture, FrameSourceExt, ImageSequenceSource, PrefetchConfig};
//!
//! #[tokio::main]
//! async fn main() -> framefetch::Result<()> {
//!     let source = ImageSequenceSource::open("/path/to/frames").await?.step_by(2);
//!     let config = PrefetchConfig::new(8).with_interval(2);
//!     let mut capture = FrameCapture::open(source, config)?;
//!
//!     while let Some(frame) = capture.read().await? {
//!         println!("frame {} ({} bytes)", capture.count(), frame.data.len());
//!     }
//!
//!     capture.stop().await
//! }
//! ```

// Core types and error handling
mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Prefetch pipeline
pub mod adapters;
pub mod capture;
pub mod driver;
pub mod source;

// Frame source implementations
pub mod sources;

// Core exports
pub use error::*;
pub use types::*;

// Main API exports
pub use adapters::FrameSourceExt;
pub use capture::{BlockingCapture, FrameCapture};
pub use source::{FrameSource, SequentialDecoder};
pub use sources::{DecoderSource, ImageFrame, ImageSequenceSource, MemorySource};

//! Error types for frame capture.
//!
//! All errors implement the `std::error::Error` trait and carry enough context to tell a
//! misbehaving frame source apart from a caller that is driving the capture incorrectly.
//!
//! ## Error Categories
//!
//! - **Source Errors**: a frame source failed for a reason other than running out of frames
//! - **File Errors**: an image sequence could not be listed or read
//! - **Usage Errors**: the capture lifecycle was driven out of order (read after end, double start)
//! - **Configuration Errors**: invalid or unparseable prefetch configuration
//! - **Worker Errors**: the background production task died without an end-of-stream marker
//!
//! ## Helper Constructors
//!
//! ```rust
//! use framefetch::CaptureError;
//! use std::path::PathBuf;
//!
//! let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "frame missing");
//! let file_error = CaptureError::file_error(PathBuf::from("/frames/000001.png"), io_err);
//! assert!(!file_error.is_usage_error());
//!
//! let decode_error = CaptureError::source_failed("corrupt macroblock at frame 42");
//! assert!(decode_error.to_string().contains("frame 42"));
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for capture operations.
pub type Result<T, E = CaptureError> = std::result::Result<T, E>;

/// Main error type for capture operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CaptureError {
    #[error("Frame source failed: {reason}")]
    Source {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Frame file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid prefetch configuration: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Frame stream already ended")]
    StreamEnded,

    #[error("Prefetch worker already started")]
    AlreadyStarted,

    #[error("Prefetch worker not started")]
    NotStarted,

    #[error("Capture has been stopped")]
    Stopped,

    #[error("Frame counter overflowed: {last} + {interval} does not fit in u64")]
    SequenceOverflow { last: u64, interval: u64 },

    #[error("Prefetch worker exited without an end-of-stream marker: {reason}")]
    WorkerExited { reason: String },

    #[error("Failed to build capture runtime")]
    Runtime {
        #[source]
        source: std::io::Error,
    },
}

impl CaptureError {
    /// Returns whether this error was caused by driving the capture lifecycle out of order.
    pub fn is_usage_error(&self) -> bool {
        match self {
            CaptureError::StreamEnded
            | CaptureError::AlreadyStarted
            | CaptureError::NotStarted
            | CaptureError::Stopped => true,
            CaptureError::Source { .. }
            | CaptureError::File { .. }
            | CaptureError::InvalidConfig { .. }
            | CaptureError::Parse { .. }
            | CaptureError::SequenceOverflow { .. }
            | CaptureError::WorkerExited { .. }
            | CaptureError::Runtime { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            CaptureError::Source { .. } => vec![
                "Check the source media is intact and decodable",
                "Open a fresh capture to retry from the beginning",
            ],
            CaptureError::File { .. } => vec![
                "Check the frame file exists and is readable",
                "Check directory permissions",
            ],
            CaptureError::InvalidConfig { .. } => vec![
                "Use a buffer_size of at least 1",
                "Use an interval of at least 1",
                "Keep initial_offset at least one interval below u64::MAX",
            ],
            CaptureError::Parse { .. } => vec![
                "Check the configuration file is valid YAML",
                "Remove fields not understood by PrefetchConfig",
            ],
            CaptureError::StreamEnded => vec![
                "Stop reading once read() has returned Ok(None) or an error",
                "Use is_ended() to check the stream state",
            ],
            CaptureError::AlreadyStarted => vec!["Call start() at most once per capture"],
            CaptureError::NotStarted => vec!["Call start() before read(), or construct with open()"],
            CaptureError::Stopped => vec!["Create a new capture; stopped captures are not reusable"],
            CaptureError::SequenceOverflow { .. } => vec![
                "Lower initial_offset so the counter cannot reach u64::MAX",
                "Lower the interval or read fewer frames per capture",
            ],
            CaptureError::WorkerExited { .. } => vec![
                "Check the logs for a panic inside the frame source",
                "Open a fresh capture to retry from the beginning",
            ],
            CaptureError::Runtime { .. } => vec![
                "Check the process can spawn threads",
                "Use FrameCapture directly from an existing tokio runtime",
            ],
        }
    }

    /// Helper constructor for source failures.
    pub fn source_failed(reason: impl Into<String>) -> Self {
        CaptureError::Source { reason: reason.into(), source: None }
    }

    /// Helper constructor for source failures with an underlying cause.
    pub fn source_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        CaptureError::Source { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        CaptureError::File { path, source }
    }

    /// Helper constructor for configuration errors.
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        CaptureError::InvalidConfig { field, reason: reason.into() }
    }

    /// Helper constructor for a worker that died without a terminal envelope.
    pub fn worker_exited(reason: impl Into<String>) -> Self {
        CaptureError::WorkerExited { reason: reason.into() }
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}

impl From<serde_yaml_ng::Error> for CaptureError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        CaptureError::Parse { context: "prefetch configuration".to_string(), details: err.to_string() }
    }
}

impl From<tokio::task::JoinError> for CaptureError {
    fn from(err: tokio::task::JoinError) -> Self {
        let reason = if err.is_panic() { "worker panicked" } else { "worker was aborted" };
        CaptureError::WorkerExited { reason: reason.to_string() }
    }
}

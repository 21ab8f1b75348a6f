//! Prefetch configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{CaptureError, Result};

/// Configuration for a prefetching capture
///
/// Fixed at construction and immutable afterwards. Can be loaded from YAML:
///
/// ```rust
/// use framefetch::PrefetchConfig;
///
/// let config = PrefetchConfig::from_yaml_str("interval: 2\nbuffer_size: 8\n").unwrap();
/// assert_eq!(config.initial_offset, 0);
/// assert_eq!(config.interval, 2);
/// assert_eq!(config.buffer_size, 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrefetchConfig {
    /// Starting value of the frame counter
    pub initial_offset: u64,

    /// Step added to the frame counter for every delivered frame
    pub interval: u64,

    /// Maximum number of envelopes held ahead of the consumer
    pub buffer_size: usize,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self { initial_offset: 0, interval: 1, buffer_size: 5 }
    }
}

impl PrefetchConfig {
    /// Create a config with the given buffer capacity and default counters
    pub fn new(buffer_size: usize) -> Self {
        Self { buffer_size, ..Self::default() }
    }

    /// Set the starting value of the frame counter
    pub fn with_initial_offset(mut self, initial_offset: u64) -> Self {
        self.initial_offset = initial_offset;
        self
    }

    /// Set the counter step per delivered frame
    pub fn with_interval(mut self, interval: u64) -> Self {
        self.interval = interval;
        self
    }

    /// Set the buffer capacity
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(CaptureError::invalid_config("buffer_size", "must be at least 1"));
        }
        if self.interval == 0 {
            return Err(CaptureError::invalid_config("interval", "must be at least 1"));
        }
        if self.initial_offset.checked_add(self.interval).is_none() {
            return Err(CaptureError::invalid_config(
                "initial_offset",
                "leaves no room for a single frame before u64::MAX",
            ));
        }
        Ok(())
    }

    /// Parse and validate a YAML configuration document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML configuration file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| CaptureError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml_str(&yaml)
    }

    /// Counter value expected after `frames` delivered frames, saturating at `u64::MAX`
    pub fn count_after(&self, frames: u64) -> u64 {
        self.initial_offset.saturating_add(frames.saturating_mul(self.interval))
    }
}

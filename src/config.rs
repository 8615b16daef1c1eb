//! Generator configuration

use crate::{BlockError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Construction parameters for a [`BlockGenerator`](crate::BlockGenerator).
///
/// All fields have defaults, so partial configuration files deserialize
/// cleanly. Validation happens once at generator construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Receiver identity baked into every generated [`BlockId`](crate::BlockId)
    pub receiver: u32,

    /// Length of one buffering interval in milliseconds
    pub block_interval_ms: u64,

    /// Bounded capacity of the push queue; a full queue stalls cutover
    /// and, transitively, producers
    pub queue_capacity: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { receiver: 0, block_interval_ms: 200, queue_capacity: 10 }
    }
}

impl GeneratorConfig {
    /// Create a configuration for the given receiver with default timing
    pub fn new(receiver: u32) -> Self {
        Self { receiver, ..Self::default() }
    }

    /// Set the block interval
    pub fn with_block_interval(mut self, interval: Duration) -> Self {
        self.block_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Set the push queue capacity
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// The block interval as a [`Duration`]
    pub fn block_interval(&self) -> Duration {
        Duration::from_millis(self.block_interval_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(BlockError::config("queue capacity must be at least 1"));
        }
        if self.block_interval_ms == 0 {
            return Err(BlockError::config("block interval must be non-zero"));
        }
        Ok(())
    }
}

//! Core data types for block batching

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Identifier for a generated block.
///
/// Derived from the receiver identity and the start of the interval that
/// produced the block (tick time minus the interval length). Unique per
/// (receiver, interval-start) pair and ordered by time for a fixed receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId {
    receiver: u32,
    interval_start_ms: u64,
}

impl BlockId {
    /// Derive an id from the nominal tick time of the cutover that produced it.
    pub(crate) fn from_tick(receiver: u32, tick: SystemTime, interval: Duration) -> Self {
        let start = tick.checked_sub(interval).unwrap_or(UNIX_EPOCH);
        let interval_start_ms =
            start.duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64;

        Self { receiver, interval_start_ms }
    }

    /// The receiver identity this block was generated for
    pub fn receiver(&self) -> u32 {
        self.receiver
    }

    /// Start of the producing interval, in milliseconds since the Unix epoch
    pub fn interval_start_ms(&self) -> u64 {
        self.interval_start_ms
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.receiver, self.interval_start_ms)
    }
}

/// An immutable batch of items captured from one buffering interval.
///
/// Created once per non-empty cutover and never mutated afterwards. Ownership
/// moves from the push queue to the worker to the listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<T> {
    id: BlockId,
    items: Vec<T>,
}

impl<T> Block<T> {
    pub(crate) fn new(id: BlockId, items: Vec<T>) -> Self {
        Self { id, items }
    }

    /// The block's identifier
    pub fn id(&self) -> BlockId {
        self.id
    }

    /// Items in the order they were added to the producing buffer
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of items in the block
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the block carries no items (never true for generated blocks)
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consume the block, returning its items
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Consume the block, returning id and items
    pub fn into_parts(self) -> (BlockId, Vec<T>) {
        (self.id, self.items)
    }
}

/// Lifecycle state of a [`BlockGenerator`](crate::BlockGenerator).
///
/// Transitions are one-way: Created -> Running -> Stopping -> Stopped.
/// There is no pause state and no restart from Stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    /// Constructed, background tasks not yet spawned
    Created,
    /// Ticker and push worker are running
    Running,
    /// Stop requested, queue drain in progress
    Stopping,
    /// Background tasks have fully returned
    Stopped,
}

impl fmt::Display for GeneratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeneratorState::Created => "created",
            GeneratorState::Running => "running",
            GeneratorState::Stopping => "stopping",
            GeneratorState::Stopped => "stopped",
        };
        write!(f, "{}", name)
    }
}

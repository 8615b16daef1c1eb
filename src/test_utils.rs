//! Test utilities for exercising the generator
//!
//! Provides a recording listener that captures every notification in arrival
//! order, plus a manually gated rate limiter for admission tests.

#![cfg(test)]

use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};

use crate::error::{BlockError, Result};
use crate::limiter::RateLimiter;
use crate::listener::BlockListener;
use crate::types::{Block, BlockId};

/// One observed listener notification
#[derive(Debug, Clone, PartialEq)]
pub enum ListenerEvent<T> {
    Added(T),
    Generated(BlockId),
    Pushed(BlockId, Vec<T>),
    Errored(String),
}

/// Listener that records every notification in arrival order
pub struct RecordingListener<T> {
    events: Mutex<Vec<ListenerEvent<T>>>,
    push_delay: Option<Duration>,
    fail_pushes: bool,
    notify: Notify,
}

impl<T: Clone + Send + Sync + 'static> RecordingListener<T> {
    pub fn new() -> Self {
        Self { events: Mutex::new(Vec::new()), push_delay: None, fail_pushes: false, notify: Notify::new() }
    }

    /// Simulate a slow consumer
    pub fn with_push_delay(mut self, delay: Duration) -> Self {
        self.push_delay = Some(delay);
        self
    }

    /// Listener whose pushes always fail
    pub fn failing() -> Self {
        Self { fail_pushes: true, ..Self::new() }
    }

    fn record(&self, event: ListenerEvent<T>) {
        self.events.lock().expect("listener event log poisoned").push(event);
        self.notify.notify_waiters();
    }

    /// Snapshot of all notifications observed so far
    pub fn events(&self) -> Vec<ListenerEvent<T>> {
        self.events.lock().expect("listener event log poisoned").clone()
    }

    /// Ids passed to `on_generate_block`, in order
    pub fn generated_ids(&self) -> Vec<BlockId> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ListenerEvent::Generated(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Blocks delivered via `on_push_block`, in order
    pub fn pushed_blocks(&self) -> Vec<(BlockId, Vec<T>)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ListenerEvent::Pushed(id, items) => Some((id, items)),
                _ => None,
            })
            .collect()
    }

    fn pushed_item_count(&self) -> usize {
        self.pushed_blocks().iter().map(|(_, items)| items.len()).sum()
    }

    fn error_count(&self) -> usize {
        self.events().iter().filter(|e| matches!(e, ListenerEvent::Errored(_))).count()
    }

    /// Wait until at least `count` items have been delivered
    pub async fn wait_for_pushed_items(&self, count: usize) {
        loop {
            let notified = self.notify.notified();
            if self.pushed_item_count() >= count {
                return;
            }
            notified.await;
        }
    }

    /// Wait until at least `count` errors have been reported
    pub async fn wait_for_errors(&self, count: usize) {
        loop {
            let notified = self.notify.notified();
            if self.error_count() >= count {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait::async_trait]
impl<T: Clone + Send + Sync + 'static> BlockListener<T> for RecordingListener<T> {
    type Metadata = String;

    fn on_add_data(&self, item: &T, _metadata: &String) {
        self.record(ListenerEvent::Added(item.clone()));
    }

    fn on_generate_block(&self, id: BlockId) {
        self.record(ListenerEvent::Generated(id));
    }

    async fn on_push_block(&self, block: Block<T>) -> Result<()> {
        if let Some(delay) = self.push_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_pushes {
            return Err(BlockError::push_failed("listener configured to fail"));
        }

        let (id, items) = block.into_parts();
        self.record(ListenerEvent::Pushed(id, items));
        Ok(())
    }

    fn on_error(&self, message: &str, cause: &BlockError) {
        self.record(ListenerEvent::Errored(format!("{}: {}", message, cause)));
    }
}

/// Rate limiter admitting only explicitly released permits
pub struct GateLimiter {
    permits: Semaphore,
}

impl GateLimiter {
    pub fn new(permits: usize) -> Self {
        Self { permits: Semaphore::new(permits) }
    }

    /// Admit `count` more items
    pub fn release(&self, count: usize) {
        self.permits.add_permits(count);
    }
}

#[async_trait::async_trait]
impl RateLimiter for GateLimiter {
    async fn acquire(&self) {
        // A closed semaphore only happens at teardown; treat it as admitted.
        if let Ok(permit) = self.permits.acquire().await {
            permit.forget();
        }
    }
}

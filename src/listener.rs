//! Listener trait for block lifecycle notifications

use crate::error::{BlockError, Result};
use crate::types::{Block, BlockId};

/// Capability set for observing the block lifecycle.
///
/// One implementer receives all four notifications. The three synchronous
/// callbacks run under the generator's internal locks and must stay cheap:
/// `on_add_data` and `on_generate_block` block producers and the next buffer
/// swap for as long as they run. `on_push_block` runs on the worker task with
/// no lock held, so heavier logic (storage, forwarding) belongs there.
#[async_trait::async_trait]
pub trait BlockListener<T>: Send + Sync + 'static {
    /// Metadata supplied on the callback-variant add path.
    type Metadata: Send + Sync;

    /// An item was appended to the current buffer.
    ///
    /// Called synchronously within the ingestion lock, only for
    /// [`add_data_with_metadata`](crate::BlockGenerator::add_data_with_metadata).
    /// Must be fast.
    fn on_add_data(&self, _item: &T, _metadata: &Self::Metadata) {}

    /// A non-empty buffer was retired into a block.
    ///
    /// Called synchronously within the swap lock, strictly before the block
    /// is queued. Must be fast.
    fn on_generate_block(&self, _id: BlockId) {}

    /// A completed block was dequeued for delivery.
    ///
    /// Called from the worker task, not under any lock; may be slow. An `Err`
    /// is reported once via [`on_error`](Self::on_error) and terminates the
    /// worker loop.
    async fn on_push_block(&self, block: Block<T>) -> Result<()>;

    /// A non-cancellation failure occurred on a background task.
    ///
    /// Called from either background task. Must not panic.
    fn on_error(&self, _message: &str, _cause: &BlockError) {}
}

// Shared listeners: callers keep a handle for inspection while the generator
// drives the notifications.
#[async_trait::async_trait]
impl<T, L> BlockListener<T> for std::sync::Arc<L>
where
    T: Send + 'static,
    L: BlockListener<T>,
{
    type Metadata = L::Metadata;

    fn on_add_data(&self, item: &T, metadata: &Self::Metadata) {
        (**self).on_add_data(item, metadata);
    }

    fn on_generate_block(&self, id: BlockId) {
        (**self).on_generate_block(id);
    }

    async fn on_push_block(&self, block: Block<T>) -> Result<()> {
        (**self).on_push_block(block).await
    }

    fn on_error(&self, message: &str, cause: &BlockError) {
        (**self).on_error(message, cause);
    }
}

//! Block generator: ingestion, buffer swap, and lifecycle

use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, trace};

use crate::config::GeneratorConfig;
use crate::driver::{Driver, DriverTasks};
use crate::error::{BlockError, Result};
use crate::limiter::{RateLimiter, Unlimited};
use crate::listener::BlockListener;
use crate::types::{Block, BlockId, GeneratorState};

/// State shared between producers and the background tasks.
///
/// One mutex guards the current buffer; every append and every swap goes
/// through it, so the listener never observes an add-notification and a
/// block-generated notification interleaved for the same buffer generation.
pub(crate) struct Shared<T, L> {
    pub(crate) config: GeneratorConfig,
    pub(crate) listener: L,
    limiter: Arc<dyn RateLimiter>,
    buffer: Mutex<Vec<T>>,
}

impl<T, L> Shared<T, L>
where
    T: Send + 'static,
    L: BlockListener<T>,
{
    pub(crate) fn new(config: GeneratorConfig, listener: L, limiter: Arc<dyn RateLimiter>) -> Self {
        Self { config, listener, limiter, buffer: Mutex::new(Vec::new()) }
    }

    /// Admit one item through the rate limiter, then append it to the
    /// current buffer.
    ///
    /// The limiter wait happens before the lock is taken, so a throttled
    /// producer never stalls the swap. The metadata callback runs while the
    /// lock is still held.
    pub(crate) async fn add(&self, item: T, metadata: Option<L::Metadata>) {
        self.limiter.acquire().await;

        let mut buffer = self.buffer.lock().await;
        buffer.push(item);

        if let Some(metadata) = metadata.as_ref()
            && let Some(item) = buffer.last()
        {
            self.listener.on_add_data(item, metadata);
        }
    }

    /// Retire the current buffer and queue the resulting block.
    ///
    /// Runs under the same lock as ingestion. An empty buffer produces no
    /// block for the interval. The lock stays held across the queue send:
    /// a full queue stalls the swap and, transitively, every producer.
    pub(crate) async fn cutover(
        &self,
        tx: &mpsc::Sender<Block<T>>,
        tick: SystemTime,
    ) -> Result<()> {
        let mut buffer = self.buffer.lock().await;
        if buffer.is_empty() {
            trace!("Cutover skipped: empty interval");
            return Ok(());
        }

        let items = std::mem::take(&mut *buffer);
        let id = BlockId::from_tick(self.config.receiver, tick, self.config.block_interval());

        self.listener.on_generate_block(id);
        debug!("Block {} generated with {} items", id, items.len());

        tx.send(Block::new(id, items))
            .await
            .map_err(|_| BlockError::queue_closed("push worker receiver dropped"))?;

        Ok(())
    }

    #[cfg(test)]
    pub(crate) async fn buffered_len(&self) -> usize {
        self.buffer.lock().await.len()
    }
}

/// Batches a high-rate stream of items into fixed-time-window blocks.
///
/// Producers call [`add_data`](Self::add_data) concurrently; a periodic
/// cutover retires the current buffer into an identified [`Block`] and hands
/// it through a bounded queue to a worker that delivers it to the
/// [`BlockListener`]. A slow consumer fills the queue, which stalls cutover
/// and then producers - deliberate backpressure instead of unbounded growth.
///
/// Lifecycle is one-way: [`start`](Self::start) once, [`stop`](Self::stop)
/// once. `stop` blocks until every queued block has been delivered.
pub struct BlockGenerator<T, L>
where
    L: BlockListener<T>,
{
    shared: Arc<Shared<T, L>>,
    state: GeneratorState,
    tasks: Option<DriverTasks>,
}

impl<T, L> BlockGenerator<T, L>
where
    T: Send + 'static,
    L: BlockListener<T>,
{
    /// Create a generator with no admission limit.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a zero queue capacity or a zero
    /// block interval.
    pub fn new(config: GeneratorConfig, listener: L) -> Result<Self> {
        Self::with_limiter(config, listener, Arc::new(Unlimited))
    }

    /// Create a generator gated by the given rate limiter
    pub fn with_limiter(
        config: GeneratorConfig,
        listener: L,
        limiter: Arc<dyn RateLimiter>,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            shared: Arc::new(Shared::new(config, listener, limiter)),
            state: GeneratorState::Created,
            tasks: None,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> GeneratorState {
        self.state
    }

    /// Add one item.
    ///
    /// Suspends until the rate limiter admits the item, then appends it to
    /// the current buffer. Safe to call from any number of concurrent tasks.
    pub async fn add_data(&self, item: T) {
        self.shared.add(item, None).await;
    }

    /// Add one item with metadata.
    ///
    /// Like [`add_data`](Self::add_data), but additionally invokes the
    /// listener's [`on_add_data`](BlockListener::on_add_data) synchronously,
    /// under the same lock used by the buffer swap, before this call returns.
    pub async fn add_data_with_metadata(&self, item: T, metadata: L::Metadata) {
        self.shared.add(item, Some(metadata)).await;
    }

    /// Start the cutover ticker and the push worker.
    ///
    /// Must be called from within a tokio runtime. Valid only once, from the
    /// `Created` state.
    pub fn start(&mut self) -> Result<()> {
        if self.state != GeneratorState::Created {
            return Err(BlockError::invalid_state(GeneratorState::Created, self.state));
        }

        self.tasks = Some(Driver::spawn(Arc::clone(&self.shared)));
        self.state = GeneratorState::Running;

        info!(
            "Block generator started (receiver {}, {:?} interval, queue capacity {})",
            self.shared.config.receiver,
            self.shared.config.block_interval(),
            self.shared.config.queue_capacity
        );
        Ok(())
    }

    /// Stop the generator and drain the push queue.
    ///
    /// The ticker is told to stop without interrupting an in-flight tick.
    /// The worker then delivers every block still queued before returning,
    /// so this call can take as long as delivering the full backlog. Items
    /// sitting in the live buffer at stop time are discarded, not flushed.
    pub async fn stop(&mut self) -> Result<()> {
        if self.state != GeneratorState::Running {
            return Err(BlockError::invalid_state(GeneratorState::Running, self.state));
        }
        self.state = GeneratorState::Stopping;

        // start() stored the tasks, so they are present in Running state.
        let Some(tasks) = self.tasks.take() else {
            self.state = GeneratorState::Stopped;
            return Err(BlockError::invalid_state(GeneratorState::Running, GeneratorState::Stopped));
        };

        info!("Stopping block generator");
        tasks.cancel.cancel();

        let ticker_result = tasks.ticker.await;
        let worker_result = tasks.worker.await;
        self.state = GeneratorState::Stopped;

        ticker_result.map_err(|e| BlockError::task_failed("cutover ticker", e))?;
        worker_result.map_err(|e| BlockError::task_failed("push worker", e))?;

        info!("Block generator stopped");
        Ok(())
    }
}

impl<T, L> std::fmt::Debug for BlockGenerator<T, L>
where
    L: BlockListener<T>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockGenerator").field("state", &self.state).finish_non_exhaustive()
    }
}

impl<T, L> Drop for BlockGenerator<T, L>
where
    L: BlockListener<T>,
{
    fn drop(&mut self) {
        // Best-effort shutdown when stop() was never called. The drain
        // guarantee only holds for an explicit stop().
        if let Some(tasks) = &self.tasks {
            debug!("Dropping running block generator");
            tasks.cancel.cancel();
        }
    }
}

//! Driver spawns and manages the batching background tasks

use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::generator::Shared;
use crate::listener::BlockListener;
use crate::types::Block;

/// Handles for the spawned background tasks
pub(crate) struct DriverTasks {
    /// Cutover ticker task, owns the queue sender
    pub(crate) ticker: JoinHandle<()>,
    /// Push worker task, owns the queue receiver
    pub(crate) worker: JoinHandle<()>,
    /// Cancellation token for graceful shutdown
    pub(crate) cancel: CancellationToken,
}

/// Driver spawns and manages the batching background tasks
///
/// Spawns the cutover ticker (swaps the buffer each interval and queues the
/// resulting block) and the push worker (drains the queue and delivers blocks
/// to the listener). The two tasks coordinate only through the bounded queue
/// and the cancellation token.
pub(crate) struct Driver;

impl Driver {
    /// Spawn the ticker and worker for the given shared state
    pub(crate) fn spawn<T, L>(shared: Arc<Shared<T, L>>) -> DriverTasks
    where
        T: Send + 'static,
        L: BlockListener<T>,
    {
        let (tx, rx) = mpsc::channel(shared.config.queue_capacity);
        let cancel = CancellationToken::new();

        let ticker = tokio::spawn(Self::cutover_ticker_task(
            Arc::clone(&shared),
            tx,
            cancel.clone(),
        ));
        let worker = tokio::spawn(Self::push_worker_task(shared, rx, cancel.clone()));

        DriverTasks { ticker, worker, cancel }
    }

    /// Cutover ticker task - swaps the buffer once per interval.
    ///
    /// Cancellation is only observed between ticks, so a cutover already in
    /// progress always runs to completion, including a send that is blocked
    /// on a full queue. Exiting drops the queue sender, which lets the
    /// worker's drain observe end-of-queue.
    async fn cutover_ticker_task<T, L>(
        shared: Arc<Shared<T, L>>,
        tx: mpsc::Sender<Block<T>>,
        cancel: CancellationToken,
    ) where
        T: Send + 'static,
        L: BlockListener<T>,
    {
        let period = shared.config.block_interval();
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // A tokio interval fires immediately; consume that tick so the first
        // cutover happens one full interval after start.
        ticker.tick().await;

        info!("Cutover ticker started ({:?} interval)", period);
        let mut tick_count = 0u64;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Cutover ticker stopped after {} ticks", tick_count);
                    break;
                }
                _ = ticker.tick() => {
                    tick_count += 1;
                    trace!("Cutover tick {}", tick_count);

                    if let Err(e) = shared.cutover(&tx, SystemTime::now()).await {
                        // Swap failures are per-tick operational failures:
                        // report and keep ticking.
                        error!("Cutover failed: {}", e);
                        shared.listener.on_error("failed to queue generated block", &e);
                    }
                }
            }
        }
    }

    /// Push worker task - drains the queue and delivers blocks.
    ///
    /// Runs with no lock held, so slow listener work never stalls producers
    /// directly (only through queue backpressure). Once cancellation is
    /// observed, switches to drain mode and delivers every remaining block
    /// before returning.
    async fn push_worker_task<T, L>(
        shared: Arc<Shared<T, L>>,
        mut rx: mpsc::Receiver<Block<T>>,
        cancel: CancellationToken,
    ) where
        T: Send + 'static,
        L: BlockListener<T>,
    {
        info!("Push worker started");
        let mut delivered = 0u64;

        loop {
            let block = tokio::select! {
                _ = cancel.cancelled() => break,
                maybe = rx.recv() => match maybe {
                    Some(block) => block,
                    None => {
                        debug!("Push queue closed");
                        info!("Push worker stopped ({} blocks delivered)", delivered);
                        return;
                    }
                }
            };

            if !Self::deliver(&shared, block, &mut delivered).await {
                return;
            }
        }

        // Drain mode: stop was requested. The exiting ticker drops the
        // sender, so recv() reports end-of-queue once the backlog is gone.
        debug!("Push worker draining");
        while let Some(block) = rx.recv().await {
            if !Self::deliver(&shared, block, &mut delivered).await {
                return;
            }
        }

        info!("Push worker stopped ({} blocks delivered)", delivered);
    }

    /// Deliver one block. Returns false when the worker loop must terminate.
    async fn deliver<T, L>(shared: &Shared<T, L>, block: Block<T>, delivered: &mut u64) -> bool
    where
        T: Send + 'static,
        L: BlockListener<T>,
    {
        let id = block.id();
        trace!("Delivering block {} ({} items)", id, block.len());

        match shared.listener.on_push_block(block).await {
            Ok(()) => {
                *delivered += 1;
                true
            }
            Err(e) => {
                // Reported once; the loop terminates and is not restarted.
                error!("Push failed for block {}: {}", id, e);
                shared.listener.on_error("failed to push block", &e);
                false
            }
        }
    }
}

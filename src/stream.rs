//! Stream-based consumption of pushed blocks

use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::{BlockError, Result};
use crate::listener::BlockListener;
use crate::types::Block;

/// Create a listener/stream pair for pull-based block consumption.
///
/// The returned [`ChannelListener`] forwards every pushed block into a
/// bounded channel; the [`BlockStream`] yields them in delivery order. A full
/// channel suspends the push worker, which extends the generator's
/// backpressure to the stream consumer.
pub fn channel<T: Send + 'static>(capacity: usize) -> (ChannelListener<T>, BlockStream<T>) {
    let (tx, rx) = mpsc::channel(capacity);
    (ChannelListener { tx }, BlockStream { inner: ReceiverStream::new(rx) })
}

/// Listener that forwards pushed blocks into a [`BlockStream`]
pub struct ChannelListener<T> {
    tx: mpsc::Sender<Block<T>>,
}

#[async_trait::async_trait]
impl<T: Send + Sync + 'static> BlockListener<T> for ChannelListener<T> {
    type Metadata = ();

    async fn on_push_block(&self, block: Block<T>) -> Result<()> {
        self.tx
            .send(block)
            .await
            .map_err(|_| BlockError::push_failed("block stream receiver dropped"))
    }
}

/// Stream of delivered blocks, in cutover order
pub struct BlockStream<T> {
    inner: ReceiverStream<Block<T>>,
}

impl<T> Stream for BlockStream<T> {
    type Item = Block<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

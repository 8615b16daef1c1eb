//! Time-windowed block batching with bounded backpressure.
//!
//! Blockgen sits between a per-item ingestion path (many concurrent
//! producers appending single items) and a per-block delivery path (one
//! consumer processing whole blocks). Items are buffered, retired into an
//! identified [`Block`] at a fixed interval, and handed through a bounded
//! queue to a worker that delivers them to a [`BlockListener`].
//!
//! # Features
//!
//! - **Fixed-window batching**: one block per non-empty interval, items in
//!   add order, ids unique and time-ordered per receiver
//! - **Backpressure**: a full push queue stalls cutover and then producers,
//!   never growing memory unboundedly behind a slow consumer
//! - **Graceful shutdown**: `stop()` drains every queued block before
//!   returning
//! - **Pluggable admission**: a [`RateLimiter`] gates each item before it is
//!   buffered
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use blockgen::{Block, BlockGenerator, BlockListener, GeneratorConfig};
//!
//! struct PrintListener;
//!
//! #[async_trait::async_trait]
//! impl BlockListener<String> for PrintListener {
//!     type Metadata = ();
//!
//!     async fn on_push_block(&self, block: Block<String>) -> blockgen::Result<()> {
//!         println!("block {}: {} items", block.id(), block.len());
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> blockgen::Result<()> {
//!     let mut generator = BlockGenerator::new(GeneratorConfig::new(1), PrintListener)?;
//!     generator.start()?;
//!
//!     generator.add_data("hello".to_string()).await;
//!
//!     generator.stop().await?;
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod config;
mod error;
#[cfg(test)]
mod test_utils;
mod types;

// Batching architecture
mod driver;
mod generator;
mod limiter;
mod listener;
pub mod stream;

// Core exports
pub use config::GeneratorConfig;
pub use error::{BlockError, Result};
pub use generator::BlockGenerator;
pub use limiter::{FixedRate, RateLimiter, Unlimited};
pub use listener::BlockListener;
pub use types::{Block, BlockId, GeneratorState};

//! Transaction-queue and responder engine for the watchtower.
//!
//! Turns concurrent, independently-arriving response obligations, all signed
//! by a single account and therefore sharing one nonce sequence, into a
//! correctly-ordered, fee-escalating stream of broadcasts, and reconciles
//! that stream against what the chain actually confirms, including when a
//! reorg invalidates confirmed history.

#![warn(unused_extern_crates)]
#![forbid(unsafe_code)]

pub use error::ResponderError;
pub use manager::ResponderManager;
pub use metrics::ResponderMetrics;
pub use queue::{FeeQueue, QueueItem, QueueItemRequest, TxFingerprint};
pub use responder::Responder;

mod error;
mod manager;
mod metrics;
pub mod queue;
mod responder;

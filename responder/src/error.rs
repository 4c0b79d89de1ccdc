use watchtower_core::ChainClientError;

use crate::queue::TxFingerprint;

/// Failure modes of the responder engine. Each condition callers may want to
/// recover from differently is its own variant.
#[derive(Debug, thiserror::Error)]
pub enum ResponderError {
    /// Caller passed an identifier the engine has no record of; engine and
    /// caller state have desynchronized
    #[error("Argument error: {0}")]
    Argument(String),
    /// The queue already holds the maximum number of in-flight transactions;
    /// the obligation is dropped, not retried
    #[error("Queue depth {max_depth} reached, cannot queue another response")]
    QueueFull {
        /// Configured maximum number of concurrent in-flight transactions
        max_depth: usize,
    },
    /// An observed chain event contradicts the queue's model of the account.
    /// The engine does not guess a repair: doing so risks double-spending a
    /// nonce
    #[error("Queue consistency error: {0}")]
    QueueConsistency(String),
    /// Dequeue called on an empty queue
    #[error("Cannot dequeue from an empty queue")]
    EmptyQueue,
    /// No queued item carries the given fingerprint
    #[error("No queued transaction matches fingerprint {0:?}")]
    NotFound(Box<TxFingerprint>),
    /// Transport failure talking to the chain or another collaborator
    #[error(transparent)]
    ChainClient(#[from] ChainClientError),
}

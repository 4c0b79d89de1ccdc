/// The result of interacting with a chain or another collaborator.
pub type ChainResult<T> = Result<T, ChainClientError>;

/// Errors returned when calling a chain node or one of the supporting
/// services. These are transport-level failures: the responder engine
/// compensates for them through its reconciliation protocol rather than
/// retry loops at the call site.
#[derive(Debug, thiserror::Error)]
pub enum ChainClientError {
    /// An RPC call to the node failed
    #[error("Provider error: {0}")]
    Provider(String),
    /// Building or signing a transaction failed
    #[error("Signer error: {0}")]
    Signer(String),
    /// The fee estimator could not produce a value
    #[error("Fee estimation error: {0}")]
    Estimation(String),
    /// The durable action store failed
    #[error("Action store error: {0}")]
    Store(String),
}

impl ChainClientError {
    /// Wrap any provider-side error into the provider variant.
    pub fn from_provider<E: std::fmt::Display>(err: E) -> Self {
        Self::Provider(err.to_string())
    }
}

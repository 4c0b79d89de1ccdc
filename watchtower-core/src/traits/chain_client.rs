use async_trait::async_trait;
use ethers::types::{Address, TransactionRequest, H256};

use crate::error::ChainResult;

/// The slice of a chain node's API the responder engine consumes.
///
/// Implementations sign with exactly one account; the engine assumes
/// exclusive use of that account's nonce sequence.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// The address of the signing account.
    fn address(&self) -> Address;

    /// The account's transaction count including pending transactions.
    /// Seeds the fee queue's base nonce at startup.
    async fn pending_transaction_count(&self, address: Address) -> ChainResult<u64>;

    /// The chain identifier of the connected network.
    async fn chain_id(&self) -> ChainResult<u64>;

    /// Sign and broadcast a transaction, returning its hash.
    async fn send_transaction(&self, tx: TransactionRequest) -> ChainResult<H256>;
}

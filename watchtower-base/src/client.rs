//! Concrete ethers-backed chain client.

use async_trait::async_trait;
use ethers::middleware::SignerMiddleware;
use ethers::prelude::Middleware;
use ethers::providers::{Http, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, BlockNumber, TransactionRequest, H256};
use eyre::Context;
use watchtower_core::{ChainClient, ChainClientError, ChainResult};

use crate::settings::{ChainConf, SignerConf};

/// A [`ChainClient`] over an HTTP JSON-RPC provider, signing locally with a
/// private key.
pub struct EthereumChainClient {
    inner: SignerMiddleware<Provider<Http>, LocalWallet>,
    address: Address,
}

impl EthereumChainClient {
    /// Connect to the configured node and bind the signing key to the
    /// node's chain id.
    pub async fn connect(chain: &ChainConf, signer: &SignerConf) -> eyre::Result<Self> {
        let provider = Provider::<Http>::try_from(chain.rpc_url.as_str())
            .context("Parsing rpc_url")?;
        let chain_id = provider
            .get_chainid()
            .await
            .context("Querying chain id")?
            .as_u64();
        let wallet: LocalWallet = signer
            .key
            .parse::<LocalWallet>()
            .context("Parsing signer key")?
            .with_chain_id(chain_id);
        let address = wallet.address();
        Ok(Self {
            inner: SignerMiddleware::new(provider, wallet),
            address,
        })
    }
}

#[async_trait]
impl ChainClient for EthereumChainClient {
    fn address(&self) -> Address {
        self.address
    }

    async fn pending_transaction_count(&self, address: Address) -> ChainResult<u64> {
        let count = self
            .inner
            .get_transaction_count(address, Some(BlockNumber::Pending.into()))
            .await
            .map_err(ChainClientError::from_provider)?;
        Ok(count.as_u64())
    }

    async fn chain_id(&self) -> ChainResult<u64> {
        let id = self
            .inner
            .get_chainid()
            .await
            .map_err(ChainClientError::from_provider)?;
        Ok(id.as_u64())
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> ChainResult<H256> {
        let pending = self
            .inner
            .send_transaction(tx, None)
            .await
            .map_err(ChainClientError::from_provider)?;
        Ok(pending.tx_hash())
    }
}

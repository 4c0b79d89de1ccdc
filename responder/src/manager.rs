use std::collections::HashMap;
use std::sync::Arc;

use ethers::types::Address;
use tokio::sync::Mutex;
use tracing::info;

use watchtower_base::settings::ResponderConf;
use watchtower_core::{ChainClient, FeeEstimator};

use crate::error::ResponderError;
use crate::metrics::ResponderMetrics;
use crate::responder::Responder;

/// Hands out responders and enforces the single-writer account discipline:
/// at most one responder may ever own a given signing account, because each
/// responder assumes exclusive control of that account's nonce sequence.
pub struct ResponderManager {
    estimator: Arc<dyn FeeEstimator>,
    conf: ResponderConf,
    metrics: ResponderMetrics,
    responders: Mutex<HashMap<Address, Arc<Responder>>>,
}

impl ResponderManager {
    /// A manager creating responders with the given estimator and config.
    pub fn new(
        estimator: Arc<dyn FeeEstimator>,
        conf: ResponderConf,
        metrics: ResponderMetrics,
    ) -> Self {
        ResponderManager {
            estimator,
            conf,
            metrics,
            responders: Mutex::new(HashMap::new()),
        }
    }

    /// Create and register a responder with exclusive ownership of the
    /// client's signing account. Fails if a responder for that account
    /// already exists.
    pub async fn create_responder(
        &self,
        client: Arc<dyn ChainClient>,
    ) -> Result<Arc<Responder>, ResponderError> {
        let address = client.address();
        let mut responders = self.responders.lock().await;
        if responders.contains_key(&address) {
            return Err(ResponderError::Argument(format!(
                "A responder already owns the account {address:?}"
            )));
        }

        let responder = Arc::new(
            Responder::new(
                client,
                self.estimator.clone(),
                self.conf.clone(),
                self.metrics.clone(),
            )
            .await?,
        );
        responders.insert(address, responder.clone());
        info!(address = ?address, "Registered responder for account");
        Ok(responder)
    }

    /// The responder owning an account, if one was created.
    pub async fn responder(&self, address: Address) -> Option<Arc<Responder>> {
        self.responders.lock().await.get(&address).cloned()
    }

    /// Release an account so a new responder can be created for it. Only
    /// sound once the released responder is dropped and no longer
    /// broadcasting.
    pub async fn release(&self, address: Address) -> Option<Arc<Responder>> {
        self.responders.lock().await.remove(&address)
    }
}

use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ChainResult;

/// A pending action recorded for crash recovery. The store does not
/// interpret it; each component serializes whatever it needs to replay.
pub type Action = serde_json::Value;

/// Identifier forged by the store for each appended action, so that the
/// same logical action stored twice can be deleted individually.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ActionId(Uuid);

impl ActionId {
    /// Create a new random action id.
    pub fn random() -> Self {
        ActionId(Uuid::new_v4())
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A durable, keyed append/delete store of pending actions per named
/// component, replayed at startup by the surrounding service. The fee
/// queue's own state is reconstructed from the chain's pending nonce count,
/// not from this store.
#[async_trait]
pub trait ActionStore: Send + Sync {
    /// Append actions for a component, returning the ids forged for them.
    async fn store_actions(
        &self,
        component: &str,
        actions: Vec<Action>,
    ) -> ChainResult<Vec<ActionId>>;

    /// Delete a previously stored action. Unknown ids are a no-op.
    async fn remove_action(&self, component: &str, id: &ActionId) -> ChainResult<()>;

    /// All actions currently stored for a component.
    async fn actions(&self, component: &str) -> ChainResult<Vec<(ActionId, Action)>>;
}

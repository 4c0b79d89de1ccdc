//! In-memory [`ActionStore`] for tests and single-process deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use watchtower_core::{Action, ActionId, ActionStore, ChainResult};

/// A process-local action store. Contents do not survive a restart, so it
/// offers no crash recovery; deployments that need replay should back the
/// trait with a database instead.
#[derive(Debug, Default)]
pub struct MemoryActionStore {
    actions: Mutex<HashMap<String, Vec<(ActionId, Action)>>>,
}

impl MemoryActionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActionStore for MemoryActionStore {
    async fn store_actions(
        &self,
        component: &str,
        actions: Vec<Action>,
    ) -> ChainResult<Vec<ActionId>> {
        let mut guard = self.actions.lock().await;
        let entry = guard.entry(component.to_owned()).or_default();
        let mut ids = Vec::with_capacity(actions.len());
        for action in actions {
            let id = ActionId::random();
            entry.push((id.clone(), action));
            ids.push(id);
        }
        Ok(ids)
    }

    async fn remove_action(&self, component: &str, id: &ActionId) -> ChainResult<()> {
        let mut guard = self.actions.lock().await;
        if let Some(entry) = guard.get_mut(component) {
            entry.retain(|(stored, _)| stored != id);
        }
        Ok(())
    }

    async fn actions(&self, component: &str) -> ChainResult<Vec<(ActionId, Action)>> {
        let guard = self.actions.lock().await;
        Ok(guard.get(component).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn stores_and_lists_actions_per_component() {
        let store = MemoryActionStore::new();
        let ids = store
            .store_actions("responder", vec![json!({"nonce": 5}), json!({"nonce": 6})])
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);

        let actions = store.actions("responder").await.unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].1, json!({"nonce": 5}));

        assert!(store.actions("watcher").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn removes_a_single_action_and_ignores_unknown_ids() {
        let store = MemoryActionStore::new();
        let ids = store
            .store_actions("responder", vec![json!(1), json!(2)])
            .await
            .unwrap();

        store.remove_action("responder", &ids[0]).await.unwrap();
        let remaining = store.actions("responder").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].0, ids[1]);

        store
            .remove_action("responder", &ActionId::random())
            .await
            .unwrap();
        assert_eq!(store.actions("responder").await.unwrap().len(), 1);
    }
}

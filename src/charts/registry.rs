//! Chart Registry
//!
//! Last successfully loaded payload per container, shared between the
//! orchestrator and the shell. Entries are overwritten on reload and never
//! removed; iteration follows first-insertion order.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::api::ChartPayload;
use crate::load::LoadToken;

#[derive(Debug, Clone, Default)]
pub struct ChartRegistry {
    entries: Arc<RwLock<Vec<(String, ChartPayload)>>>,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `container_id`
    pub async fn insert(&self, container_id: &str, payload: ChartPayload) {
        let mut entries = self.entries.write().await;
        Self::upsert(&mut entries, container_id, payload);
    }

    /// Insert only if `token` is still current when the lock is taken
    ///
    /// Returns whether the entry was written.
    pub async fn insert_current(
        &self,
        token: &LoadToken,
        container_id: &str,
        payload: ChartPayload,
    ) -> bool {
        let mut entries = self.entries.write().await;
        if !token.is_current() {
            return false;
        }
        Self::upsert(&mut entries, container_id, payload);
        true
    }

    fn upsert(entries: &mut Vec<(String, ChartPayload)>, container_id: &str, payload: ChartPayload) {
        match entries.iter_mut().find(|(id, _)| id == container_id) {
            Some((_, existing)) => *existing = payload,
            None => entries.push((container_id.to_string(), payload)),
        }
    }

    pub async fn get(&self, container_id: &str) -> Option<ChartPayload> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .find(|(id, _)| id == container_id)
            .map(|(_, payload)| payload.clone())
    }

    pub async fn container_ids(&self) -> Vec<String> {
        let entries = self.entries.read().await;
        entries.iter().map(|(id, _)| id.clone()).collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Remembers which reports already had an SLA breach alert sent
#[async_trait]
pub trait AlertDedupStore: Send + Sync {
    async fn was_alerted(&self, report_id: Uuid) -> bool;

    async fn mark_alerted(&self, report_id: Uuid);

    async fn alerted_count(&self) -> usize;
}

/// Process-local store. Contents are lost on restart and not shared between
/// instances, so either can produce a repeat alert.
#[derive(Default)]
pub struct InMemoryAlertStore {
    alerted: RwLock<HashSet<Uuid>>,
}

impl InMemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AlertDedupStore for InMemoryAlertStore {
    async fn was_alerted(&self, report_id: Uuid) -> bool {
        self.alerted.read().await.contains(&report_id)
    }

    async fn mark_alerted(&self, report_id: Uuid) {
        self.alerted.write().await.insert(report_id);
    }

    async fn alerted_count(&self) -> usize {
        self.alerted.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mark_and_check() {
        let store = InMemoryAlertStore::new();
        let id = Uuid::now_v7();

        assert!(!store.was_alerted(id).await);
        store.mark_alerted(id).await;
        store.mark_alerted(id).await;
        assert!(store.was_alerted(id).await);
        assert_eq!(store.alerted_count().await, 1);
    }
}

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use tracing::warn;

use crate::{StoreError, r#trait::RequestStore, request::DeliveryRequest, types::RequestId};

/// In-memory request store implementation
///
/// Stores requests in a `HashMap` protected by an `RwLock`. Primarily
/// intended for testing; production deployments back this trait with the
/// database the broader system already persists requests into.
///
/// # Capacity Management
/// The store can be configured with a maximum capacity so that accidental
/// production use cannot grow without bound. When capacity is reached,
/// inserts fail with an error.
#[derive(Debug, Clone)]
pub struct MemoryRequestStore {
    requests: Arc<RwLock<HashMap<RequestId, DeliveryRequest>>>,
    /// Maximum number of requests to store (None = unlimited)
    capacity: Option<usize>,
}

impl MemoryRequestStore {
    /// Create a new empty store with unlimited capacity
    #[must_use]
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(HashMap::new())),
            capacity: None,
        }
    }

    /// Create a new store with a capacity limit
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            requests: Arc::new(RwLock::new(HashMap::new())),
            capacity: Some(capacity),
        }
    }

    /// Get the current number of requests in the store
    ///
    /// Recovers gracefully if the lock is poisoned by accessing the
    /// underlying data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.requests
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Check if the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryRequestStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RequestStore for MemoryRequestStore {
    async fn insert(&self, request: &DeliveryRequest) -> crate::Result<()> {
        if let Some(cap) = self.capacity
            && !self.requests.read()?.contains_key(&request.id)
            && self.len() >= cap
        {
            warn!(capacity = cap, "Request store is full, rejecting insert");
            return Err(StoreError::Internal(format!(
                "Request store capacity exceeded: {}/{cap} requests",
                self.len(),
            )));
        }

        let mut requests = self.requests.write()?;
        if requests.contains_key(&request.id) {
            return Err(StoreError::AlreadyExists(request.id.clone()));
        }
        requests.insert(request.id.clone(), request.clone());

        Ok(())
    }

    async fn load(&self, id: &RequestId) -> crate::Result<DeliveryRequest> {
        self.requests
            .read()?
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn update(&self, request: &DeliveryRequest) -> crate::Result<()> {
        let mut requests = self.requests.write()?;
        if requests.contains_key(&request.id) {
            requests.insert(request.id.clone(), request.clone());
            Ok(())
        } else {
            Err(StoreError::NotFound(request.id.clone()))
        }
    }

    async fn update_all(&self, updates: &[DeliveryRequest]) -> crate::Result<()> {
        let mut requests = self.requests.write()?;

        // All-or-nothing: verify the whole batch before writing any of it
        if let Some(missing) = updates.iter().find(|r| !requests.contains_key(&r.id)) {
            return Err(StoreError::NotFound(missing.id.clone()));
        }

        for request in updates {
            requests.insert(request.id.clone(), request.clone());
        }

        Ok(())
    }

    async fn list(&self) -> crate::Result<Vec<RequestId>> {
        let mut ids: Vec<_> = self.requests.read()?.keys().cloned().collect();

        // ULIDs are lexicographically sortable by creation time
        ids.sort();

        Ok(ids)
    }

    async fn pending_reconciliation(&self) -> crate::Result<Vec<DeliveryRequest>> {
        let mut pending: Vec<_> = self
            .requests
            .read()?
            .values()
            .filter(|r| r.is_awaiting_reconciliation())
            .cloned()
            .collect();

        pending.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request() -> DeliveryRequest {
        DeliveryRequest::new(json!({
            "platform": "wellsite",
            "customerId": "acme",
            "ticketNumber": "T-1",
            "kind": "invoice",
        }))
    }

    #[tokio::test]
    async fn test_basic_operations() {
        let store = MemoryRequestStore::new();
        let record = request();

        store.insert(&record).await.expect("insert");
        assert_eq!(store.len(), 1);

        let loaded = store.load(&record.id).await.expect("load");
        assert_eq!(loaded, record);

        let mut updated = record.clone();
        updated.is_processed = true;
        store.update(&updated).await.expect("update");
        let loaded = store.load(&record.id).await.expect("reload");
        assert!(loaded.is_processed);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicates() {
        let store = MemoryRequestStore::new();
        let record = request();

        store.insert(&record).await.expect("first insert");
        let result = store.insert(&record).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_load_missing_request() {
        let store = MemoryRequestStore::new();
        let result = store.load(&RequestId::generate()).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_capacity_limit() {
        let store = MemoryRequestStore::with_capacity(1);
        store.insert(&request()).await.expect("first insert");

        let result = store.insert(&request()).await;
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("capacity exceeded")
        );
    }

    #[tokio::test]
    async fn test_update_all_is_all_or_nothing() {
        let store = MemoryRequestStore::new();
        let mut stored = request();
        store.insert(&stored).await.expect("insert");

        stored.is_processed = true;
        let unknown = request();
        let result = store.update_all(&[stored.clone(), unknown]).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));

        // The batch failed, so the stored request is untouched
        let loaded = store.load(&stored.id).await.expect("load");
        assert!(!loaded.is_processed);

        store.update_all(&[stored.clone()]).await.expect("batch");
        let loaded = store.load(&stored.id).await.expect("reload");
        assert!(loaded.is_processed);
    }

    #[tokio::test]
    async fn test_pending_reconciliation_view() {
        let store = MemoryRequestStore::new();

        let unprocessed = request();
        store.insert(&unprocessed).await.expect("insert");

        let mut processed = request();
        processed.is_processed = true;
        store.insert(&processed).await.expect("insert");

        let mut finalised = request();
        finalised.is_processed = true;
        finalised.has_reached_final_status = true;
        store.insert(&finalised).await.expect("insert");

        let pending = store.pending_reconciliation().await.expect("pending");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, processed.id);
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_arrival() {
        let store = MemoryRequestStore::new();
        let mut inserted = Vec::new();
        for _ in 0..10 {
            let record = request();
            store.insert(&record).await.expect("insert");
            inserted.push(record.id);
        }

        let mut expected = inserted.clone();
        expected.sort();
        assert_eq!(store.list().await.expect("list"), expected);
    }
}

//! Process-local document collection.
//!
//! Keeps documents in creation order and fans every change out to all live
//! subscribers as a full snapshot. Closed subscribers are pruned on the next
//! change.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

use super::{
    DocumentStore, Document, Fields, Snapshot, SnapshotResult, StoreError, Subscription,
    merge_fields, new_document_id,
};

#[derive(Default)]
struct Inner {
    docs: Vec<Document>,
    subscribers: Vec<mpsc::UnboundedSender<SnapshotResult>>,
    offline: bool,
    writes: usize,
}

impl Inner {
    fn broadcast(&mut self) {
        self.subscribers.retain(|s| !s.is_closed());
        for sender in &self.subscribers {
            let _ = sender.send(Ok(self.docs.clone()));
        }
    }
}

#[derive(Clone)]
pub struct MemoryStore {
    collection: String,
    inner: Arc<RwLock<Inner>>,
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("memory store lock poisoned".to_string())
}

impl MemoryStore {
    pub fn new(collection: &str) -> Self {
        MemoryStore {
            collection: collection.to_string(),
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    /// While offline every read and write fails with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut inner) = self.inner.write() {
            inner.offline = offline;
        }
    }

    /// Deliver a feed error to every subscriber.
    pub fn push_feed_error(&self, reason: &str) {
        if let Ok(mut inner) = self.inner.write() {
            inner.subscribers.retain(|s| !s.is_closed());
            for sender in &inner.subscribers {
                let _ = sender.send(Err(StoreError::Unavailable(reason.to_string())));
            }
        }
    }

    /// Number of successful create/update calls so far.
    pub fn write_count(&self) -> usize {
        self.inner.read().map(|i| i.writes).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .read()
            .map(|i| i.subscribers.iter().filter(|s| !s.is_closed()).count())
            .unwrap_or(0)
    }

    /// Current fields of one document.
    pub fn get(&self, id: &str) -> Option<Fields> {
        let inner = self.inner.read().ok()?;
        inner.docs.iter().find(|d| d.id == id).map(|d| d.data.clone())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn collection(&self) -> &str {
        &self.collection
    }

    async fn create(&self, fields: Fields) -> Result<String, StoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        if inner.offline {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        let id = new_document_id();
        inner.docs.push(Document {
            id: id.clone(),
            data: fields,
        });
        inner.writes += 1;
        inner.broadcast();
        Ok(id)
    }

    async fn update_fields(&self, id: &str, patch: Fields) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        if inner.offline {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        let doc = inner
            .docs
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        merge_fields(&mut doc.data, patch);
        inner.writes += 1;
        inner.broadcast();
        Ok(())
    }

    async fn read_all(&self) -> Result<Snapshot, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        if inner.offline {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        Ok(inner.docs.clone())
    }

    async fn subscribe(&self) -> Result<Subscription, StoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        if inner.offline {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(Ok(inner.docs.clone()));
        inner.subscribers.push(tx);
        Ok(Subscription::new(rx, None))
    }
}

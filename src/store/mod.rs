//! External document store seam.
//!
//! The view-model only ever talks to a [`DocumentStore`]: create a record,
//! patch fields by id, read the whole collection, or subscribe to
//! whole-collection snapshots.
//!
//! # Backends
//!
//! - [`PgStore`]: JSONB documents in PostgreSQL, change feed via `LISTEN`
//! - [`MemoryStore`]: process-local collection, used by tests and `STORE_BACKEND=memory`

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use rand::distr::{Alphanumeric, SampleString};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::{Config, StoreBackend};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Document fields.
pub type Fields = Map<String, Value>;

/// A stored record: store-assigned id plus its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Fields,
}

/// Complete point-in-time copy of a collection.
pub type Snapshot = Vec<Document>;

pub type SnapshotResult = Result<Snapshot, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Db(sqlx::Error),
    Decode { id: String, reason: String },
    NotFound(String),
    /// The store refused the write or the feed ended.
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Db(e) => write!(f, "Database error: {e}"),
            StoreError::Decode { id, reason } => write!(f, "Document {id} is malformed: {reason}"),
            StoreError::NotFound(id) => write!(f, "Document {id} not found"),
            StoreError::Unavailable(reason) => write!(f, "Store unavailable: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Db(e)
    }
}

/// Live feed of collection snapshots. Dropping it, or calling
/// [`Subscription::unsubscribe`], ends the feed.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<SnapshotResult>,
    feeder: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(rx: mpsc::UnboundedReceiver<SnapshotResult>, feeder: Option<JoinHandle<()>>) -> Self {
        Subscription { rx, feeder }
    }

    /// Next snapshot or feed error; `None` once the feed is closed.
    pub async fn next(&mut self) -> Option<SnapshotResult> {
        self.rx.recv().await
    }

    pub fn unsubscribe(mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.rx.close();
        if let Some(handle) = self.feeder.take() {
            handle.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Backend name for diagnostics.
    fn name(&self) -> &str;

    /// Collection this store reads and writes.
    fn collection(&self) -> &str;

    /// Create a record and return the id the store assigned.
    async fn create(&self, fields: Fields) -> Result<String, StoreError>;

    /// Merge `patch` into the record's fields; `null` values remove the key.
    async fn update_fields(&self, id: &str, patch: Fields) -> Result<(), StoreError>;

    /// Full collection read, in creation order.
    async fn read_all(&self) -> Result<Snapshot, StoreError>;

    /// Subscribe to whole-collection snapshots. The current state is
    /// delivered first, then one snapshot per change.
    async fn subscribe(&self) -> Result<Subscription, StoreError>;
}

/// 20-character alphanumeric document id.
pub fn new_document_id() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), 20)
}

/// Field-merge rule shared by every backend.
pub fn merge_fields(data: &mut Fields, patch: Fields) {
    for (key, value) in patch {
        if value.is_null() {
            data.remove(&key);
        } else {
            data.insert(key, value);
        }
    }
}

/// Build the store selected by configuration.
pub async fn create_store(config: &Config) -> Result<Arc<dyn DocumentStore>, StoreError> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let url = config.database_url.as_deref().ok_or_else(|| {
                StoreError::Unavailable("DATABASE_URL is not set".to_string())
            })?;
            let pool = crate::db::init_pool(url, config.db_max_connections).await?;
            crate::db::run_migrations(&pool).await?;
            log::info!("Using PostgreSQL document store, collection '{}'", config.collection);
            Ok(Arc::new(PgStore::new(pool, &config.collection)))
        }
        StoreBackend::Memory => {
            log::warn!("Using in-memory document store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new(&config.collection)))
        }
    }
}

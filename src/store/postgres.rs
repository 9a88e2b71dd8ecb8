//! PostgreSQL document store.
//!
//! Documents live in the `documents` table as JSONB, one row per record,
//! partitioned by collection name. A trigger announces every write on the
//! `documents_changed` channel; subscribers re-read the whole collection on
//! each announcement for their collection, and again whenever the listener
//! connection drops or fails.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use sqlx::types::Json;
use tokio::sync::mpsc;

use super::{
    DocumentStore, Document, Fields, Snapshot, SnapshotResult, StoreError, Subscription,
    new_document_id,
};

pub const CHANGE_CHANNEL: &str = "documents_changed";

/// Pause after a failed listener call before re-reading and listening again.
const FEED_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    collection: String,
}

impl PgStore {
    pub fn new(pool: PgPool, collection: &str) -> Self {
        PgStore {
            pool,
            collection: collection.to_string(),
        }
    }
}

async fn read_collection(pool: &PgPool, collection: &str) -> Result<Snapshot, StoreError> {
    let rows: Vec<(String, Json<Value>)> = sqlx::query_as(
        "SELECT id, data FROM documents WHERE collection = $1 ORDER BY created_at, id",
    )
    .bind(collection)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(id, Json(data))| match data {
            Value::Object(data) => Ok(Document { id, data }),
            other => Err(StoreError::Decode {
                id,
                reason: format!("expected an object, found {other}"),
            }),
        })
        .collect()
}

#[async_trait]
impl DocumentStore for PgStore {
    fn name(&self) -> &str {
        "postgres"
    }

    fn collection(&self) -> &str {
        &self.collection
    }

    async fn create(&self, fields: Fields) -> Result<String, StoreError> {
        let id = new_document_id();
        sqlx::query("INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)")
            .bind(&self.collection)
            .bind(&id)
            .bind(Json(Value::Object(fields)))
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn update_fields(&self, id: &str, patch: Fields) -> Result<(), StoreError> {
        // `||` overwrites the patched keys; stripping nulls drops cleared ones.
        let result = sqlx::query(
            "UPDATE documents SET data = jsonb_strip_nulls(data || $3), updated_at = now() \
             WHERE collection = $1 AND id = $2",
        )
        .bind(&self.collection)
        .bind(id)
        .bind(Json(Value::Object(patch)))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn read_all(&self) -> Result<Snapshot, StoreError> {
        read_collection(&self.pool, &self.collection).await
    }

    async fn subscribe(&self) -> Result<Subscription, StoreError> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(CHANGE_CHANNEL).await?;

        let (tx, rx) = mpsc::unbounded_channel::<SnapshotResult>();
        let initial = read_collection(&self.pool, &self.collection).await;
        let _ = tx.send(initial);

        let pool = self.pool.clone();
        let collection = self.collection.clone();
        let feeder = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    notification = listener.try_recv() => {
                        match notification {
                            Ok(Some(n)) if n.payload() != collection => continue,
                            Ok(Some(_)) => {}
                            // Connection dropped. The next try_recv reconnects; notifications
                            // sent meanwhile are gone.
                            Ok(None) => {
                                log::warn!("Change feed for '{}' lost its connection, re-reading", collection);
                            }
                            Err(e) => {
                                log::warn!("Change feed for '{}' interrupted: {}", collection, e);
                                if tx.send(Err(StoreError::Db(e))).is_err() {
                                    break;
                                }
                                tokio::time::sleep(FEED_RETRY_DELAY).await;
                            }
                        }
                        if tx.send(read_collection(&pool, &collection).await).is_err() {
                            break;
                        }
                    }
                }
            }
            log::debug!("Change feed for '{}' closed", collection);
        });

        Ok(Subscription::new(rx, Some(feeder)))
    }
}

//! Keeping the roster in step with the store: the startup repair pass and
//! the live subscription loop.

use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::{AttendanceViewModel, SyncMode};
use crate::models::participant::Asistencia;
use crate::store::{DocumentStore, Fields, StoreError};

/// Wait before re-subscribing after the feed ends or cannot be opened.
pub const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub scanned: usize,
    pub repaired: usize,
    pub failed: usize,
}

/// Give every document without an `asistencia` field the not-present
/// default. One update per document needing repair, issued together and
/// awaited together; documents that already have the field are untouched, so
/// a second run writes nothing.
pub async fn backfill(store: &dyn DocumentStore) -> Result<BackfillReport, StoreError> {
    let docs = store.read_all().await?;
    let pending: Vec<String> = docs
        .iter()
        .filter(|d| !d.data.contains_key("asistencia"))
        .map(|d| d.id.clone())
        .collect();

    let updates = pending.iter().map(|id| {
        let mut patch = Fields::new();
        patch.insert(
            "asistencia".to_string(),
            Value::String(Asistencia::NoActivo.as_str().to_string()),
        );
        async move { (id, store.update_fields(id, patch).await) }
    });

    let mut report = BackfillReport {
        scanned: docs.len(),
        ..BackfillReport::default()
    };
    for (id, result) in join_all(updates).await {
        match result {
            Ok(()) => report.repaired += 1,
            Err(e) => {
                log::error!("Backfill of {} failed: {}", id, e);
                report.failed += 1;
            }
        }
    }
    Ok(report)
}

/// Handle on the running sync. Stopping it (or dropping it) unsubscribes.
pub struct SyncHandle {
    task: Option<JoinHandle<()>>,
}

impl SyncHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn stop(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Run the repair pass, then bring the roster up: a single read in
/// fetch-once mode, otherwise a background subscription that re-subscribes
/// after `RESUBSCRIBE_DELAY` if the feed drops.
pub async fn start(vm: Arc<AttendanceViewModel>) -> SyncHandle {
    match backfill(vm.store()).await {
        Ok(report) => log::info!(
            "Backfill: scanned={}, repaired={}, failed={}",
            report.scanned,
            report.repaired,
            report.failed
        ),
        Err(e) => vm.apply_sync_error(&e),
    }

    match vm.mode() {
        SyncMode::FetchOnce => {
            let _ = vm.refresh().await;
            SyncHandle { task: None }
        }
        SyncMode::Subscribe => SyncHandle {
            task: Some(tokio::spawn(run_subscription(vm))),
        },
    }
}

async fn run_subscription(vm: Arc<AttendanceViewModel>) {
    loop {
        match vm.store().subscribe().await {
            Ok(mut subscription) => {
                log::info!(
                    "Subscribed to '{}' on {} store",
                    vm.store().collection(),
                    vm.store().name()
                );
                while let Some(item) = subscription.next().await {
                    match item {
                        Ok(snapshot) => vm.apply_snapshot(snapshot),
                        Err(e) => vm.apply_sync_error(&e),
                    }
                }
                log::warn!("Change feed for '{}' ended", vm.store().collection());
            }
            Err(e) => vm.apply_sync_error(&e),
        }
        tokio::time::sleep(RESUBSCRIBE_DELAY).await;
    }
}

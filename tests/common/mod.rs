//! Shared test infrastructure.
//!
//! - `seeded_store()` - in-memory collection with a small mixed roster
//! - `fetch_vm()` / `subscribed_vm()` - view-models over a memory store
//! - `wait_until()` - poll a condition while the subscription catches up

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};

use asistencia::models::participant::{Participant, ParticipantForm};
use asistencia::store::{DocumentStore, Fields, MemoryStore};
use asistencia::viewmodel::sync::{self, SyncHandle};
use asistencia::viewmodel::{AttendanceViewModel, SyncMode};

pub const COLLECTION: &str = "participantes";

// ============================================================================
// DOCUMENTS
// ============================================================================

pub fn fields(value: Value) -> Fields {
    value.as_object().cloned().expect("fields must be a JSON object")
}

/// A stored participant document as written by the add flow.
pub fn doc(nombre: &str, telefono: &str, departamento: &str, tipo: &str, asistencia: &str) -> Fields {
    fields(json!({
        "nombre": nombre,
        "telefono": telefono,
        "departamento": departamento,
        "tipo": tipo,
        "asistencia": asistencia,
        "fecha": "2025-03-14T15:00:00Z",
    }))
}

pub fn form(nombre: &str, departamento: &str, tipo: &str, telefono: &str) -> ParticipantForm {
    ParticipantForm {
        nombre: nombre.to_string(),
        departamento: departamento.to_string(),
        tipo: tipo.to_string(),
        telefono: telefono.to_string(),
    }
}

pub fn participant(id: &str, value: Value) -> Participant {
    Participant::from_fields(id, &fields(value)).expect("test participant must decode")
}

// ============================================================================
// STORES AND VIEW-MODELS
// ============================================================================

/// Three participants: Ana (present), Luis and Óscar (absent).
pub async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new(COLLECTION);
    for d in [
        doc("Ana", "98658758", "Cortés", "Cliente", "Activo"),
        doc("Luis", "33221100", "Cortés", "Empleado", "No Activo"),
        doc("Óscar", "95551234", "Olancho", "Cliente", "No Activo"),
    ] {
        store.create(d).await.expect("seed create");
    }
    store
}

pub async fn id_of(store: &MemoryStore, nombre: &str) -> String {
    store
        .read_all()
        .await
        .expect("read_all")
        .into_iter()
        .find(|d| d.data.get("nombre") == Some(&json!(nombre)))
        .map(|d| d.id)
        .expect("participant present in store")
}

/// Fetch-once view-model, already loaded.
pub async fn fetch_vm(store: &MemoryStore) -> (Arc<AttendanceViewModel>, SyncHandle) {
    let vm = Arc::new(AttendanceViewModel::new(Arc::new(store.clone()), SyncMode::FetchOnce));
    let handle = sync::start(vm.clone()).await;
    (vm, handle)
}

/// Subscribed view-model, waited until the first snapshot arrived.
pub async fn subscribed_vm(store: &MemoryStore) -> (Arc<AttendanceViewModel>, SyncHandle) {
    let vm = Arc::new(AttendanceViewModel::new(Arc::new(store.clone()), SyncMode::Subscribe));
    let handle = sync::start(vm.clone()).await;
    tokio::time::timeout(Duration::from_secs(2), vm.wait_ready())
        .await
        .expect("first snapshot within 2s");
    (vm, handle)
}

/// Poll `check` every 10ms for up to 2s.
pub async fn wait_until<F>(mut check: F)
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !check() {
        if tokio::time::Instant::now() > deadline {
            panic!("condition not reached within 2s");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

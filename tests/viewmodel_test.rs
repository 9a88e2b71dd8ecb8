//! Attendance reconciliation: dialog flow, sync modes, backfill, snapshots.

mod common;

use asistencia::models::participant::{Asistencia, Color, Tipo, ValidationError};
use asistencia::store::{Document, DocumentStore, MemoryStore};
use asistencia::viewmodel::sync::{self, backfill};
use asistencia::viewmodel::{
    AttendanceViewModel, Modal, Notice, NoticeLevel, SyncMode, ViewEvent, ViewModelError,
    ViewState,
};
use common::*;
use serde_json::json;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Mark / unmark
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_mark_then_unmark_round_trip() {
    let store = seeded_store().await;
    let (vm, _sync) = fetch_vm(&store).await;
    let id = id_of(&store, "Luis").await;
    let mut state = ViewState::default();

    vm.begin_mark(&mut state, &id).unwrap();
    assert_eq!(
        state.modal,
        Modal::PickColor { id: id.clone(), nombre: "Luis".to_string() }
    );

    vm.choose_color(&mut state, Color::Verde).await.unwrap();
    assert_eq!(state.modal, Modal::None);
    let stored = store.get(&id).unwrap();
    assert_eq!(stored.get("asistencia"), Some(&json!("Activo")));
    assert_eq!(stored.get("color"), Some(&json!("verde")));
    let local = vm.find(&id).unwrap();
    assert!(local.is_present());
    assert_eq!(local.color, Some(Color::Verde));

    vm.request_unmark(&mut state, &id).unwrap();
    assert!(matches!(state.modal, Modal::ConfirmUnmark { .. }));
    assert_eq!(
        state.modal.mensaje().unwrap(),
        "¿Está seguro de que desea eliminar la asistencia de Luis?"
    );

    vm.confirm_unmark(&mut state).await.unwrap();
    let stored = store.get(&id).unwrap();
    assert_eq!(stored.get("asistencia"), Some(&json!("No Activo")));
    assert!(!stored.contains_key("color"));
    let local = vm.find(&id).unwrap();
    assert!(!local.is_present());
    assert_eq!(local.color, None);
}

#[tokio::test]
async fn test_status_and_color_go_out_in_one_write() {
    let store = seeded_store().await;
    let (vm, _sync) = fetch_vm(&store).await;
    let id = id_of(&store, "Óscar").await;
    let before = store.write_count();

    let mut state = ViewState::default();
    vm.begin_mark(&mut state, &id).unwrap();
    vm.choose_color(&mut state, Color::Azul).await.unwrap();

    assert_eq!(store.write_count(), before + 1);
}

#[tokio::test]
async fn test_marking_present_participant_retags_color() {
    let store = seeded_store().await;
    let (vm, _sync) = fetch_vm(&store).await;
    let id = id_of(&store, "Ana").await;

    vm.mark(&id, Some(Color::Rojo)).await.unwrap();

    let p = vm.find(&id).unwrap();
    assert!(p.is_present());
    assert_eq!(p.color, Some(Color::Rojo));
}

#[tokio::test]
async fn test_confirm_without_pending_dialog_is_refused() {
    let store = seeded_store().await;
    let (vm, _sync) = fetch_vm(&store).await;
    let before = store.write_count();
    let mut state = ViewState::default();

    assert!(matches!(
        vm.confirm_unmark(&mut state).await,
        Err(ViewModelError::NoPendingAction)
    ));
    assert!(matches!(
        vm.choose_color(&mut state, Color::Verde).await,
        Err(ViewModelError::NoPendingAction)
    ));
    assert_eq!(store.write_count(), before);
}

#[tokio::test]
async fn test_cancel_discards_pending_unmark() {
    let store = seeded_store().await;
    let (vm, _sync) = fetch_vm(&store).await;
    let id = id_of(&store, "Ana").await;
    let before = store.write_count();
    let mut state = ViewState::default();

    vm.request_unmark(&mut state, &id).unwrap();
    vm.cancel(&mut state);

    assert_eq!(state.modal, Modal::None);
    assert_eq!(store.write_count(), before);
    assert!(vm.find(&id).unwrap().is_present());
}

#[tokio::test]
async fn test_mark_unknown_id_is_not_found() {
    let store = seeded_store().await;
    let (vm, _sync) = fetch_vm(&store).await;
    let before = store.write_count();
    let mut state = ViewState::default();

    assert!(matches!(
        vm.begin_mark(&mut state, "nope"),
        Err(ViewModelError::NotFound(_))
    ));
    assert!(matches!(
        vm.mark("nope", None).await,
        Err(ViewModelError::NotFound(_))
    ));
    assert_eq!(state.modal, Modal::None);
    assert_eq!(store.write_count(), before);
}

#[tokio::test]
async fn test_failed_mark_keeps_local_state_and_notifies() {
    let store = seeded_store().await;
    let (vm, _sync) = fetch_vm(&store).await;
    let id = id_of(&store, "Luis").await;
    let mut events = vm.subscribe_events();
    store.set_offline(true);

    let result = vm.mark(&id, Some(Color::Negro)).await;

    assert!(matches!(result, Err(ViewModelError::Store(_))));
    assert!(!vm.find(&id).unwrap().is_present());
    match events.recv().await.unwrap() {
        ViewEvent::Notice(n) => assert_eq!(n.message, "Error al marcar asistencia. Intente nuevamente."),
        other => panic!("expected notice, got {other:?}"),
    }
}

#[tokio::test]
async fn test_stored_status_is_always_one_of_two_values() {
    let store = seeded_store().await;
    let (vm, _sync) = fetch_vm(&store).await;
    let luis = id_of(&store, "Luis").await;
    let ana = id_of(&store, "Ana").await;
    let mut state = ViewState::default();

    vm.mark(&luis, Some(Color::Amarillo)).await.unwrap();
    vm.request_unmark(&mut state, &ana).unwrap();
    vm.confirm_unmark(&mut state).await.unwrap();
    vm.add_participant(&form("Pedro", "Valle", "Otros", "44445555"))
        .await
        .unwrap();

    for d in store.read_all().await.unwrap() {
        let status = d.data.get("asistencia").and_then(|v| v.as_str());
        assert!(
            matches!(status, Some("Activo") | Some("No Activo")),
            "{} has status {:?}",
            d.id,
            status
        );
    }
}

// ---------------------------------------------------------------------------
// Search and summary
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_search_ignores_accents_and_matches_phone_forms() {
    let store = seeded_store().await;
    let (vm, _sync) = fetch_vm(&store).await;

    let names = |q: &str| -> Vec<String> { vm.search(q).into_iter().map(|p| p.nombre).collect() };
    assert_eq!(names("oscar"), vec!["Óscar"]);
    assert_eq!(names("ÓSCAR"), vec!["Óscar"]);
    assert_eq!(names("9865-8758"), vec!["Ana"]);
    assert_eq!(names("98658758"), vec!["Ana"]);
    assert_eq!(names(""), vec!["Ana", "Luis", "Óscar"]);
    assert!(names("zzz").is_empty());
}

#[tokio::test]
async fn test_list_summary_counts_filtered_rows() {
    let store = seeded_store().await;
    let (vm, _sync) = fetch_vm(&store).await;
    let mut state = ViewState::default();
    vm.set_search(&mut state, "a");

    let summary = vm.list_summary(&state);
    // Ana, Óscar ("oscar" contains "a"); Luis does not
    assert_eq!(summary.mostrando, 2);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.presentes, 1);
    assert_eq!(summary.ausentes, 1);
}

// ---------------------------------------------------------------------------
// Snapshots and sync
// ---------------------------------------------------------------------------

fn document(id: &str, nombre: &str, asistencia: &str) -> Document {
    Document {
        id: id.to_string(),
        data: doc(nombre, "11112222", "Yoro", "Cliente", asistencia),
    }
}

#[tokio::test]
async fn test_later_snapshot_replaces_earlier_one() {
    let store = MemoryStore::new(COLLECTION);
    let vm = AttendanceViewModel::new(Arc::new(store), SyncMode::Subscribe);
    assert!(!vm.is_ready());

    vm.apply_snapshot(vec![
        document("a", "Ana", "Activo"),
        document("b", "Beto", "No Activo"),
    ]);
    vm.apply_snapshot(vec![document("c", "Carla", "Activo")]);

    let roster = vm.roster();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].id, "c");
    assert!(vm.is_ready());
}

#[tokio::test]
async fn test_undecodable_documents_are_skipped_and_legacy_tipo_defaults() {
    let store = MemoryStore::new(COLLECTION);
    let vm = AttendanceViewModel::new(Arc::new(store), SyncMode::Subscribe);

    vm.apply_snapshot(vec![
        Document {
            id: "legacy".to_string(),
            data: fields(json!({ "nombre": "Vieja", "telefono": "12345678", "departamento": "Valle" })),
        },
        Document {
            id: "bad".to_string(),
            data: fields(json!({ "nombre": "Mala", "departamento": "Narnia" })),
        },
    ]);

    let roster = vm.roster();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].tipo, Tipo::Otros);
    assert_eq!(roster[0].asistencia, Asistencia::NoActivo);
    assert_eq!(roster[0].fecha_label(), "Sin fecha");
}

#[tokio::test]
async fn test_undecodable_documents_still_reserve_name_and_phone() {
    let store = MemoryStore::new(COLLECTION);
    let vm = AttendanceViewModel::new(Arc::new(store.clone()), SyncMode::Subscribe);

    vm.apply_snapshot(vec![Document {
        id: "bad".to_string(),
        data: fields(json!({ "nombre": "Mala", "telefono": "1234-5678", "departamento": "Narnia" })),
    }]);
    assert!(vm.roster().is_empty());

    let err = vm
        .add_participant(&form(" mala ", "Valle", "Cliente", "1111-2222"))
        .await
        .unwrap_err();
    assert!(matches!(err, ViewModelError::Validation(ValidationError::DuplicateName)));

    let err = vm
        .add_participant(&form("Buena", "Valle", "Cliente", "12345678"))
        .await
        .unwrap_err();
    assert!(matches!(err, ViewModelError::Validation(ValidationError::DuplicatePhone)));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_document_without_name_reserves_only_its_phone() {
    let store = MemoryStore::new(COLLECTION);
    let vm = AttendanceViewModel::new(Arc::new(store.clone()), SyncMode::Subscribe);

    vm.apply_snapshot(vec![Document {
        id: "sin-nombre".to_string(),
        data: fields(json!({ "telefono": "12345678", "departamento": "Valle" })),
    }]);

    let err = vm
        .add_participant(&form("Otra", "Valle", "Cliente", "1234-5678"))
        .await
        .unwrap_err();
    assert!(matches!(err, ViewModelError::Validation(ValidationError::DuplicatePhone)));

    vm.add_participant(&form("Otra", "Valle", "Cliente", "8765-4321"))
        .await
        .expect("name is free");
}

// ---------------------------------------------------------------------------
// Live push
// ---------------------------------------------------------------------------

#[test]
fn test_only_snapshots_are_shared_with_every_client() {
    let snapshot = ViewEvent::Snapshot { total: 3, presentes: 1 };
    assert!(snapshot.is_shared());

    for level in [NoticeLevel::Success, NoticeLevel::Error] {
        let notice = ViewEvent::Notice(Notice {
            level,
            message: "¡Ya existe un participante con ese nombre!".to_string(),
        });
        assert!(!notice.is_shared());
    }
}

#[tokio::test]
async fn test_subscribe_mode_waits_for_the_feed() {
    let store = seeded_store().await;
    let (vm, _sync) = subscribed_vm(&store).await;
    let id = id_of(&store, "Luis").await;

    vm.mark(&id, Some(Color::Verde)).await.unwrap();
    // the write itself does not touch local state
    assert!(!vm.find(&id).unwrap().is_present());

    wait_until(|| vm.find(&id).is_some_and(|p| p.is_present())).await;
    assert_eq!(vm.find(&id).unwrap().color, Some(Color::Verde));
}

#[tokio::test]
async fn test_feed_sees_writes_from_other_clients() {
    let store = seeded_store().await;
    let (vm, _sync) = subscribed_vm(&store).await;

    store
        .create(doc("Zoe", "77778888", "Lempira", "Proveedor", "No Activo"))
        .await
        .unwrap();

    wait_until(|| vm.roster().len() == 4).await;
    assert_eq!(vm.roster().last().unwrap().nombre, "Zoe");
}

#[tokio::test]
async fn test_feed_error_keeps_roster_and_records_error() {
    let store = seeded_store().await;
    let (vm, _sync) = subscribed_vm(&store).await;
    let before = vm.roster();

    store.push_feed_error("connection reset");
    wait_until(|| vm.last_error().is_some()).await;

    assert_eq!(vm.roster(), before);
    assert!(vm.last_error().unwrap().contains("connection reset"));

    // the next good snapshot clears it
    let id = id_of(&store, "Luis").await;
    vm.mark(&id, None).await.unwrap();
    wait_until(|| vm.last_error().is_none()).await;
}

#[tokio::test]
async fn test_fetch_once_with_store_down_is_not_ready() {
    let store = seeded_store().await;
    store.set_offline(true);
    let (vm, handle) = fetch_vm(&store).await;

    assert!(!vm.is_ready());
    assert!(vm.last_error().is_some());
    assert!(vm.roster().is_empty());
    assert!(!handle.is_running());
}

#[tokio::test]
async fn test_stopping_sync_unsubscribes() {
    let store = seeded_store().await;
    let (_vm, handle) = subscribed_vm(&store).await;
    assert!(handle.is_running());
    assert_eq!(store.subscriber_count(), 1);

    handle.stop();
    wait_until(|| store.subscriber_count() == 0).await;
}

// ---------------------------------------------------------------------------
// Backfill
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_backfill_repairs_only_missing_status_and_is_idempotent() {
    let store = MemoryStore::new(COLLECTION);
    store
        .create(fields(json!({ "nombre": "Sin Estado", "departamento": "Valle" })))
        .await
        .unwrap();
    store
        .create(fields(json!({ "nombre": "Otro", "departamento": "Yoro" })))
        .await
        .unwrap();
    store
        .create(doc("Con Estado", "12341234", "Yoro", "Cliente", "Activo"))
        .await
        .unwrap();
    let writes = store.write_count();

    let report = backfill(&store).await.unwrap();
    assert_eq!((report.scanned, report.repaired, report.failed), (3, 2, 0));
    assert_eq!(store.write_count(), writes + 2);

    for d in store.read_all().await.unwrap() {
        assert!(d.data.contains_key("asistencia"));
    }
    let present = store
        .read_all()
        .await
        .unwrap()
        .into_iter()
        .find(|d| d.data.get("nombre") == Some(&json!("Con Estado")))
        .unwrap();
    assert_eq!(present.data.get("asistencia"), Some(&json!("Activo")));

    let again = backfill(&store).await.unwrap();
    assert_eq!(again.repaired, 0);
    assert_eq!(store.write_count(), writes + 2);
}

#[tokio::test]
async fn test_start_runs_backfill_before_first_load() {
    let store = MemoryStore::new(COLLECTION);
    store
        .create(fields(json!({ "nombre": "Legado", "departamento": "Valle", "tipo": "Cliente" })))
        .await
        .unwrap();

    let vm = Arc::new(AttendanceViewModel::new(Arc::new(store.clone()), SyncMode::FetchOnce));
    let _handle = sync::start(vm.clone()).await;

    assert!(vm.is_ready());
    let id = id_of(&store, "Legado").await;
    assert_eq!(store.get(&id).unwrap().get("asistencia"), Some(&json!("No Activo")));
}

//! Add-participant validation and record defaults.

mod common;

use asistencia::models::participant::{Asistencia, Departamento, Tipo, ValidationError, validate_new};
use asistencia::store::DocumentStore;
use asistencia::viewmodel::{NoticeLevel, ViewEvent, ViewModelError};
use common::*;
use serde_json::json;

fn roster() -> Vec<asistencia::models::participant::Participant> {
    vec![
        participant(
            "a1",
            json!({ "nombre": "Ana", "telefono": "98658758", "departamento": "Cortés", "tipo": "Cliente", "asistencia": "Activo" }),
        ),
        participant(
            "a2",
            json!({ "nombre": "Luis", "telefono": "33221100", "departamento": "Cortés", "tipo": "Empleado" }),
        ),
    ]
}

#[test]
fn test_valid_form_yields_absent_record_without_color() {
    let new = validate_new(&form("  María López ", "Olancho", "Proveedor", "9555-1234"), &roster())
        .expect("valid form");
    assert_eq!(new.nombre, "María López");
    assert_eq!(new.telefono, "95551234");
    assert_eq!(new.departamento, Departamento::Olancho);
    assert_eq!(new.tipo, Tipo::Proveedor);
    assert_eq!(new.asistencia, Asistencia::NoActivo);
    assert!(new.color.is_none());

    let stored = new.to_fields();
    assert_eq!(stored.get("asistencia"), Some(&json!("No Activo")));
    assert!(!stored.contains_key("color"));
    assert!(stored.get("fecha").and_then(|f| f.as_str()).is_some());
}

#[test]
fn test_missing_field_is_rejected_first() {
    let err = validate_new(&form("Ana", "", "Cliente", "1"), &roster()).unwrap_err();
    assert_eq!(err, ValidationError::MissingFields);
}

#[test]
fn test_short_phone_is_rejected() {
    let err = validate_new(&form("Pedro", "Valle", "Cliente", "1234"), &roster()).unwrap_err();
    assert_eq!(err, ValidationError::InvalidPhone);
}

#[test]
fn test_overlong_phone_is_rejected() {
    let err = validate_new(&form("Pedro", "Valle", "Cliente", "986587589999"), &roster()).unwrap_err();
    assert_eq!(err, ValidationError::InvalidPhone);

    let err = validate_new(&form("Pedro", "Valle", "Cliente", "1111-22223"), &[]).unwrap_err();
    assert_eq!(err, ValidationError::InvalidPhone);
}

#[test]
fn test_phone_with_letters_is_rejected() {
    let err = validate_new(&form("Pedro", "Valle", "Cliente", "1111-222a"), &[]).unwrap_err();
    assert_eq!(err, ValidationError::InvalidPhone);
}

#[test]
fn test_spaced_phone_is_accepted_as_digits() {
    let new = validate_new(&form("Pedro", "Valle", "Cliente", " 1111 2222 "), &roster()).expect("valid");
    assert_eq!(new.telefono, "11112222");
}

#[test]
fn test_duplicate_name_ignores_case_and_padding() {
    let err = validate_new(&form("  ANA ", "Valle", "Cliente", "11112222"), &roster()).unwrap_err();
    assert_eq!(err, ValidationError::DuplicateName);
}

#[test]
fn test_ungrouped_phone_still_collides_with_stored_digits() {
    let err = validate_new(&form("Pedro", "Valle", "Cliente", "98658758"), &roster()).unwrap_err();
    assert_eq!(err, ValidationError::DuplicatePhone);
}

#[test]
fn test_unknown_departamento_is_rejected() {
    let err = validate_new(&form("Pedro", "Narnia", "Cliente", "11112222"), &roster()).unwrap_err();
    assert_eq!(err, ValidationError::UnknownDepartamento("Narnia".to_string()));
}

#[tokio::test]
async fn test_add_writes_one_document_and_appears_after_refresh() {
    let store = seeded_store().await;
    let (vm, _sync) = fetch_vm(&store).await;
    let before = store.write_count();

    let id = vm
        .add_participant(&form("Pedro Pérez", "Valle", "Agroservicio", "1111-2222"))
        .await
        .expect("add");

    assert_eq!(store.write_count(), before + 1);
    let stored = store.get(&id).expect("stored document");
    assert_eq!(stored.get("telefono"), Some(&json!("11112222")));
    assert_eq!(stored.get("asistencia"), Some(&json!("No Activo")));

    let p = vm.find(&id).expect("roster refreshed in fetch-once mode");
    assert!(!p.is_present());
    assert_eq!(vm.roster().len(), 4);
}

#[tokio::test]
async fn test_rejected_add_writes_nothing_and_notifies() {
    let store = seeded_store().await;
    let (vm, _sync) = fetch_vm(&store).await;
    let mut events = vm.subscribe_events();
    let before = store.write_count();

    let err = vm
        .add_participant(&form("ana", "Valle", "Cliente", "11112222"))
        .await
        .unwrap_err();

    assert!(matches!(err, ViewModelError::Validation(ValidationError::DuplicateName)));
    assert_eq!(store.write_count(), before);
    match events.recv().await.expect("notice") {
        ViewEvent::Notice(n) => {
            assert_eq!(n.level, NoticeLevel::Error);
            assert_eq!(n.message, ValidationError::DuplicateName.to_string());
        }
        other => panic!("expected notice, got {other:?}"),
    }
}

#[tokio::test]
async fn test_store_failure_on_add_surfaces_as_store_error() {
    let store = seeded_store().await;
    let (vm, _sync) = fetch_vm(&store).await;
    store.set_offline(true);

    let err = vm
        .add_participant(&form("Pedro", "Valle", "Cliente", "11112222"))
        .await
        .unwrap_err();
    assert!(matches!(err, ViewModelError::Store(_)));

    store.set_offline(false);
    assert_eq!(store.read_all().await.unwrap().len(), 3);
}

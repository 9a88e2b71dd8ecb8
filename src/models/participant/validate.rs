use chrono::Utc;
use serde_json::{Map, Value};
use std::fmt;

use super::catalog::{Asistencia, Departamento, Tipo};
use super::phone;
use super::types::{NewParticipant, Participant, ParticipantForm};

/// Why an add-participant request was refused before any write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingFields,
    InvalidPhone,
    UnknownDepartamento(String),
    UnknownTipo(String),
    DuplicateName,
    DuplicatePhone,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingFields => write!(f, "Debe completar todos los campos."),
            ValidationError::InvalidPhone => {
                write!(f, "El teléfono debe tener 8 dígitos (ej: 9865-8758).")
            }
            ValidationError::UnknownDepartamento(d) => write!(f, "Departamento desconocido: {d}"),
            ValidationError::UnknownTipo(t) => write!(f, "Tipo de participante desconocido: {t}"),
            ValidationError::DuplicateName => {
                write!(f, "¡Ya existe un participante con ese nombre!")
            }
            ValidationError::DuplicatePhone => {
                write!(f, "¡Ya existe un participante con ese número de teléfono!")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Name comparison key for the uniqueness check.
pub fn normalize_name(nombre: &str) -> String {
    nombre.trim().to_lowercase()
}

/// Name and phone keys a new participant must not collide with.
///
/// Built from decoded participants and also from stored documents that could
/// not be decoded, so a record hidden from the roster still reserves its
/// name and number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TakenKeys {
    pub nombre: Option<String>,
    pub telefono: Option<String>,
}

impl TakenKeys {
    pub fn of(participant: &Participant) -> Self {
        TakenKeys {
            nombre: Some(normalize_name(&participant.nombre)),
            telefono: Some(phone::digits_only(&participant.telefono)),
        }
    }

    /// Keys of a raw stored document; fields that are missing or not strings
    /// reserve nothing.
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        let text = |key: &str| fields.get(key).and_then(Value::as_str);
        TakenKeys {
            nombre: text("nombre")
                .map(normalize_name)
                .filter(|n| !n.is_empty()),
            telefono: text("telefono")
                .map(phone::digits_only)
                .filter(|t| !t.is_empty()),
        }
    }
}

/// Validate an add request against the current roster.
///
/// Checks run in order: required fields, phone format, enumerated values,
/// name uniqueness, phone uniqueness. The returned record defaults to
/// not-present with no color and is stamped with the current time.
pub fn validate_new(
    form: &ParticipantForm,
    roster: &[Participant],
) -> Result<NewParticipant, ValidationError> {
    validate_new_against(form, roster, &[])
}

/// [`validate_new`], with extra keys that are taken although they are not in
/// the roster.
pub fn validate_new_against(
    form: &ParticipantForm,
    roster: &[Participant],
    withheld: &[TakenKeys],
) -> Result<NewParticipant, ValidationError> {
    let nombre = form.nombre.trim();
    if nombre.is_empty()
        || form.departamento.trim().is_empty()
        || form.tipo.trim().is_empty()
        || form.telefono.trim().is_empty()
    {
        return Err(ValidationError::MissingFields);
    }

    let telefono = phone::parse_phone(&form.telefono).ok_or(ValidationError::InvalidPhone)?;

    let departamento = Departamento::from_label(&form.departamento)
        .ok_or_else(|| ValidationError::UnknownDepartamento(form.departamento.clone()))?;
    let tipo = Tipo::from_label(&form.tipo)
        .ok_or_else(|| ValidationError::UnknownTipo(form.tipo.clone()))?;

    let taken: Vec<TakenKeys> = roster
        .iter()
        .map(TakenKeys::of)
        .chain(withheld.iter().cloned())
        .collect();

    let key = normalize_name(nombre);
    if taken.iter().any(|t| t.nombre.as_deref() == Some(key.as_str())) {
        return Err(ValidationError::DuplicateName);
    }

    if taken
        .iter()
        .any(|t| t.telefono.as_deref() == Some(telefono.as_str()))
    {
        return Err(ValidationError::DuplicatePhone);
    }

    Ok(NewParticipant {
        nombre: nombre.to_string(),
        telefono,
        departamento,
        tipo,
        asistencia: Asistencia::NoActivo,
        color: None,
        fecha: Utc::now(),
    })
}

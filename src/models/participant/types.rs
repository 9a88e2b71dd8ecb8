use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::catalog::{Asistencia, Color, Departamento, Tipo};
use super::phone;

/// One registrant as known to the roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Participant {
    pub id: String,
    pub nombre: String,
    /// Digits only.
    pub telefono: String,
    pub departamento: Departamento,
    pub tipo: Tipo,
    pub asistencia: Asistencia,
    pub color: Option<Color>,
    pub fecha: Option<DateTime<Utc>>,
}

impl Participant {
    /// Decode a stored document. Missing `asistencia` reads as not-present
    /// and missing `tipo` as `Otros`; the repair pass persists the former.
    pub fn from_fields(id: &str, fields: &Map<String, Value>) -> Result<Self, String> {
        let doc: StoredFields = serde_json::from_value(Value::Object(fields.clone()))
            .map_err(|e| e.to_string())?;
        Ok(Participant {
            id: id.to_string(),
            nombre: doc.nombre,
            telefono: phone::digits_only(&doc.telefono),
            departamento: doc.departamento,
            tipo: doc.tipo,
            asistencia: doc.asistencia,
            color: doc.color,
            fecha: doc.fecha,
        })
    }

    pub fn is_present(&self) -> bool {
        self.asistencia.is_present()
    }

    /// Phone in the fixed 4-4 grouping.
    pub fn telefono_display(&self) -> String {
        phone::display(&self.telefono)
    }

    pub fn color_label(&self) -> &'static str {
        self.color.map(Color::label).unwrap_or("N/A")
    }

    /// Registration date as dd/mm/yyyy, or "Sin fecha" for legacy records.
    pub fn fecha_label(&self) -> String {
        match self.fecha {
            Some(f) => f.with_timezone(&chrono::Local).format("%d/%m/%Y").to_string(),
            None => "Sin fecha".to_string(),
        }
    }
}

/// Field layout of a stored participant document.
#[derive(Debug, Deserialize)]
struct StoredFields {
    nombre: String,
    #[serde(default)]
    telefono: String,
    departamento: Departamento,
    #[serde(default)]
    tipo: Tipo,
    #[serde(default)]
    asistencia: Asistencia,
    #[serde(default)]
    color: Option<Color>,
    #[serde(default, deserialize_with = "deserialize_fecha")]
    fecha: Option<DateTime<Utc>>,
}

/// Accepts RFC 3339 strings and `{ "seconds": n }` timestamp objects.
fn deserialize_fecha<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FechaRepr {
        Text(String),
        Timestamp { seconds: i64 },
    }

    let repr: Option<FechaRepr> = Option::deserialize(deserializer)?;
    Ok(match repr {
        Some(FechaRepr::Text(s)) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|d| d.with_timezone(&Utc)),
        Some(FechaRepr::Timestamp { seconds }) => Utc.timestamp_opt(seconds, 0).single(),
        None => None,
    })
}

/// A validated participant ready to be written. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewParticipant {
    pub nombre: String,
    pub telefono: String,
    pub departamento: Departamento,
    pub tipo: Tipo,
    pub asistencia: Asistencia,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    pub fecha: DateTime<Utc>,
}

impl NewParticipant {
    /// Document fields for the create-record call.
    pub fn to_fields(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Raw add-participant input, as submitted by the add dialog.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ParticipantForm {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub departamento: String,
    #[serde(default)]
    pub tipo: String,
    #[serde(default)]
    pub telefono: String,
}

/// Field patch for attendance changes. `null` clears a field.
pub fn attendance_patch(asistencia: Asistencia, color: Option<Color>) -> Map<String, Value> {
    let mut patch = Map::new();
    patch.insert(
        "asistencia".to_string(),
        Value::String(asistencia.as_str().to_string()),
    );
    match (asistencia, color) {
        (Asistencia::Activo, Some(c)) => {
            patch.insert("color".to_string(), Value::String(c.value().to_string()));
        }
        (Asistencia::Activo, None) => {}
        (Asistencia::NoActivo, _) => {
            patch.insert("color".to_string(), Value::Null);
        }
    }
    patch
}

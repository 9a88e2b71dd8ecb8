//! CSV report export.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use super::types::Participant;

#[derive(Debug)]
pub enum ExportError {
    /// Nothing to export; no file is produced.
    Empty,
    Csv(csv::Error),
    Io(std::io::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Empty => write!(f, "No hay participantes para exportar."),
            ExportError::Csv(e) => write!(f, "CSV error: {e}"),
            ExportError::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<csv::Error> for ExportError {
    fn from(e: csv::Error) -> Self {
        ExportError::Csv(e)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Io(e)
    }
}

/// One exported line.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Nombre")]
    nombre: &'a str,
    #[serde(rename = "Teléfono")]
    telefono: String,
    #[serde(rename = "Departamento")]
    departamento: &'static str,
    #[serde(rename = "Tipo")]
    tipo: &'static str,
    #[serde(rename = "Color")]
    color: &'static str,
    #[serde(rename = "Fecha Registro")]
    fecha: String,
    #[serde(rename = "Estado")]
    estado: &'static str,
}

impl<'a> From<&'a Participant> for ExportRow<'a> {
    fn from(p: &'a Participant) -> Self {
        ExportRow {
            nombre: &p.nombre,
            telefono: p.telefono_display(),
            departamento: p.departamento.as_str(),
            tipo: p.tipo.as_str(),
            color: p.color_label(),
            fecha: p.fecha_label(),
            estado: p.asistencia.estado_label(),
        }
    }
}

/// `reporte_asistencia_<dd-mm-yyyy>.csv`
pub fn file_name(date: NaiveDate) -> String {
    format!("reporte_asistencia_{}.csv", date.format("%d-%m-%Y"))
}

/// Serialize rows, in the given order, with a header line.
pub fn to_csv(rows: &[Participant]) -> Result<Vec<u8>, ExportError> {
    if rows.is_empty() {
        return Err(ExportError::Empty);
    }
    let mut writer = csv::Writer::from_writer(Vec::new());
    for p in rows {
        writer.serialize(ExportRow::from(p))?;
    }
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

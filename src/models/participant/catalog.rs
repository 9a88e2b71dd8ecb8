//! Fixed enumerations shared by validation, filtering, and rendering.
//!
//! Every table here is the single source for its values: forms build their
//! dropdowns from `ALL`, the dashboard zero-fills regions from
//! `Departamento::ALL`, and stored documents carry the `as_str()` spelling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Administrative regions (departamentos de Honduras).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Departamento {
    #[serde(rename = "Atlántida")]
    Atlantida,
    #[serde(rename = "Choluteca")]
    Choluteca,
    #[serde(rename = "Colón")]
    Colon,
    #[serde(rename = "Comayagua")]
    Comayagua,
    #[serde(rename = "Copán")]
    Copan,
    #[serde(rename = "Cortés")]
    Cortes,
    #[serde(rename = "El Paraíso")]
    ElParaiso,
    #[serde(rename = "Francisco Morazán")]
    FranciscoMorazan,
    #[serde(rename = "Gracias a Dios")]
    GraciasADios,
    #[serde(rename = "Intibucá")]
    Intibuca,
    #[serde(rename = "Islas de la Bahía")]
    IslasDeLaBahia,
    #[serde(rename = "La Paz")]
    LaPaz,
    #[serde(rename = "Lempira")]
    Lempira,
    #[serde(rename = "Ocotepeque")]
    Ocotepeque,
    #[serde(rename = "Olancho")]
    Olancho,
    #[serde(rename = "Santa Bárbara")]
    SantaBarbara,
    #[serde(rename = "Valle")]
    Valle,
    #[serde(rename = "Yoro")]
    Yoro,
}

impl Departamento {
    pub const ALL: [Departamento; 18] = [
        Departamento::Atlantida,
        Departamento::Choluteca,
        Departamento::Colon,
        Departamento::Comayagua,
        Departamento::Copan,
        Departamento::Cortes,
        Departamento::ElParaiso,
        Departamento::FranciscoMorazan,
        Departamento::GraciasADios,
        Departamento::Intibuca,
        Departamento::IslasDeLaBahia,
        Departamento::LaPaz,
        Departamento::Lempira,
        Departamento::Ocotepeque,
        Departamento::Olancho,
        Departamento::SantaBarbara,
        Departamento::Valle,
        Departamento::Yoro,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Departamento::Atlantida => "Atlántida",
            Departamento::Choluteca => "Choluteca",
            Departamento::Colon => "Colón",
            Departamento::Comayagua => "Comayagua",
            Departamento::Copan => "Copán",
            Departamento::Cortes => "Cortés",
            Departamento::ElParaiso => "El Paraíso",
            Departamento::FranciscoMorazan => "Francisco Morazán",
            Departamento::GraciasADios => "Gracias a Dios",
            Departamento::Intibuca => "Intibucá",
            Departamento::IslasDeLaBahia => "Islas de la Bahía",
            Departamento::LaPaz => "La Paz",
            Departamento::Lempira => "Lempira",
            Departamento::Ocotepeque => "Ocotepeque",
            Departamento::Olancho => "Olancho",
            Departamento::SantaBarbara => "Santa Bárbara",
            Departamento::Valle => "Valle",
            Departamento::Yoro => "Yoro",
        }
    }

    /// Exact label lookup, after trimming surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|d| d.as_str() == label)
    }
}

impl fmt::Display for Departamento {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Participant categories. Legacy documents without one count as `Otros`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tipo {
    Cliente,
    Empleado,
    Proveedor,
    Agroservicio,
    #[default]
    Otros,
}

impl Tipo {
    pub const ALL: [Tipo; 5] = [
        Tipo::Cliente,
        Tipo::Empleado,
        Tipo::Proveedor,
        Tipo::Agroservicio,
        Tipo::Otros,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tipo::Cliente => "Cliente",
            Tipo::Empleado => "Empleado",
            Tipo::Proveedor => "Proveedor",
            Tipo::Agroservicio => "Agroservicio",
            Tipo::Otros => "Otros",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|t| t.as_str() == label)
    }

    /// CSS modifier used for the category badge.
    pub fn badge_class(self) -> &'static str {
        match self {
            Tipo::Cliente => "badge-blue",
            Tipo::Empleado => "badge-green",
            Tipo::Proveedor => "badge-yellow",
            Tipo::Agroservicio => "badge-purple",
            Tipo::Otros => "badge-orange",
        }
    }
}

impl fmt::Display for Tipo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two-valued attendance status, stored as "Activo" / "No Activo".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Asistencia {
    #[serde(rename = "Activo")]
    Activo,
    #[default]
    #[serde(rename = "No Activo")]
    NoActivo,
}

impl Asistencia {
    pub fn as_str(self) -> &'static str {
        match self {
            Asistencia::Activo => "Activo",
            Asistencia::NoActivo => "No Activo",
        }
    }

    pub fn is_present(self) -> bool {
        self == Asistencia::Activo
    }

    /// Label used in reports and exports.
    pub fn estado_label(self) -> &'static str {
        match self {
            Asistencia::Activo => "Presente",
            Asistencia::NoActivo => "Ausente",
        }
    }
}

/// Tag palette offered when attendance is marked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Verde,
    Amarillo,
    Anaranjado,
    Negro,
    Rojo,
    Azul,
}

impl Color {
    pub const ALL: [Color; 6] = [
        Color::Verde,
        Color::Amarillo,
        Color::Anaranjado,
        Color::Negro,
        Color::Rojo,
        Color::Azul,
    ];

    /// Stored value.
    pub fn value(self) -> &'static str {
        match self {
            Color::Verde => "verde",
            Color::Amarillo => "amarillo",
            Color::Anaranjado => "anaranjado",
            Color::Negro => "negro",
            Color::Rojo => "rojo",
            Color::Azul => "azul",
        }
    }

    /// Display name.
    pub fn label(self) -> &'static str {
        match self {
            Color::Verde => "Verde",
            Color::Amarillo => "Amarillo",
            Color::Anaranjado => "Anaranjado",
            Color::Negro => "Negro",
            Color::Rojo => "Rojo",
            Color::Azul => "Azul",
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            Color::Verde => "#22c55e",
            Color::Amarillo => "#eab308",
            Color::Anaranjado => "#f97316",
            Color::Negro => "#000000",
            Color::Rojo => "#ef4444",
            Color::Azul => "#2563eb",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|c| c.value() == value)
    }
}

use serde::{Deserialize, Serialize};

/// Which dialog a client has open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Modal {
    #[default]
    None,
    AddParticipant,
    PickColor { id: String, nombre: String },
    ConfirmUnmark { id: String, nombre: String },
}

impl Modal {
    pub fn is_open(&self) -> bool {
        *self != Modal::None
    }

    /// Prompt shown in the unmark confirmation.
    pub fn mensaje(&self) -> Option<String> {
        match self {
            Modal::ConfirmUnmark { nombre, .. } => Some(format!(
                "¿Está seguro de que desea eliminar la asistencia de {nombre}?"
            )),
            _ => None,
        }
    }
}

/// Per-client UI state: search text and open dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub busqueda: String,
    #[serde(default)]
    pub modal: Modal,
}

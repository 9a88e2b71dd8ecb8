//! User-facing notice texts shared by the view-model and the page handlers.

pub const PARTICIPANTE_AGREGADO: &str = "¡Participante agregado correctamente!";
pub const ERROR_AGREGAR: &str = "Error al agregar participante. Intente nuevamente.";
pub const ASISTENCIA_MARCADA: &str = "¡Asistencia marcada correctamente!";
pub const ERROR_MARCAR: &str = "Error al marcar asistencia. Intente nuevamente.";
pub const ASISTENCIA_ELIMINADA: &str = "Asistencia eliminada correctamente.";
pub const ERROR_DESMARCAR: &str = "Error al eliminar asistencia. Intente nuevamente.";
pub const ERROR_SINCRONIZACION: &str = "Error de sincronización con la base de datos.";
pub const PARTICIPANTE_NO_ENCONTRADO: &str = "Participante no encontrado.";
pub const COLOR_INVALIDO: &str = "Seleccione un color válido.";

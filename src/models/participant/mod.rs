pub mod catalog;
pub mod export;
pub mod metrics;
pub mod phone;
pub mod query;
pub mod types;
pub mod validate;

pub use catalog::{Asistencia, Color, Departamento, Tipo};
pub use metrics::{Breakdown, Metrics};
pub use query::{Criterion, FiltroAsistencia, ReportFilter, ReportQuery};
pub use types::{NewParticipant, Participant, ParticipantForm, attendance_patch};
pub use validate::{TakenKeys, ValidationError, validate_new, validate_new_against};

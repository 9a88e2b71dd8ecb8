use actix_session::Session;
use askama::Template;

use crate::models::participant::{Breakdown, Color, Departamento, Metrics, Participant, Tipo};
use crate::session::{Flash, take_flash};
use crate::viewmodel::{AttendanceViewModel, ListSummary, Modal};

pub const APP_NAME: &str = "Control de Asistencia";

/// Common context shared by every page.
/// Templates access these as `ctx.flash`, `ctx.active_tab`, etc.
pub struct PageContext {
    pub app_name: String,
    pub active_tab: String,
    pub flash: Option<Flash>,
    pub ready: bool,
    pub sync_error: Option<String>,
}

impl PageContext {
    pub fn build(session: &Session, vm: &AttendanceViewModel, active_tab: &str) -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            active_tab: active_tab.to_string(),
            flash: take_flash(session),
            ready: vm.is_ready(),
            sync_error: vm.last_error(),
        }
    }
}

/// A `<select>` entry with its selection precomputed.
pub struct SelectOption {
    pub value: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn list<I, S>(values: I, current: &str) -> Vec<SelectOption>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        values
            .into_iter()
            .map(|v| {
                let value = v.into();
                let selected = value == current;
                SelectOption { value, selected }
            })
            .collect()
    }
}

pub struct ColorOption {
    pub value: String,
    pub label: String,
    pub hex: String,
}

impl ColorOption {
    pub fn palette() -> Vec<ColorOption> {
        Color::ALL
            .iter()
            .map(|c| ColorOption {
                value: c.value().to_string(),
                label: c.label().to_string(),
                hex: c.hex().to_string(),
            })
            .collect()
    }
}

/// Flattened participant for table rows.
pub struct ParticipantRow {
    pub id: String,
    pub nombre: String,
    pub telefono: String,
    pub departamento: String,
    pub tipo: String,
    pub tipo_badge: String,
    pub presente: bool,
    pub estado: String,
    pub color_label: String,
    pub color_hex: String,
    pub fecha: String,
}

impl From<&Participant> for ParticipantRow {
    fn from(p: &Participant) -> Self {
        ParticipantRow {
            id: p.id.clone(),
            nombre: p.nombre.clone(),
            telefono: p.telefono_display(),
            departamento: p.departamento.to_string(),
            tipo: p.tipo.to_string(),
            tipo_badge: p.tipo.badge_class().to_string(),
            presente: p.is_present(),
            estado: p.asistencia.estado_label().to_string(),
            color_label: p.color_label().to_string(),
            color_hex: p.color.map(Color::hex).unwrap_or("").to_string(),
            fecha: p.fecha_label(),
        }
    }
}

pub fn rows(participants: &[Participant]) -> Vec<ParticipantRow> {
    participants.iter().map(ParticipantRow::from).collect()
}

/// Which dialog to draw on the roster page.
#[derive(Default)]
pub struct ModalView {
    pub show_add: bool,
    pub show_color: bool,
    pub show_confirm: bool,
    pub nombre: String,
    pub mensaje: String,
}

impl From<&Modal> for ModalView {
    fn from(modal: &Modal) -> Self {
        let mensaje = modal.mensaje().unwrap_or_default();
        match modal {
            Modal::None => ModalView::default(),
            Modal::AddParticipant => ModalView {
                show_add: true,
                ..ModalView::default()
            },
            Modal::PickColor { nombre, .. } => ModalView {
                show_color: true,
                nombre: nombre.clone(),
                ..ModalView::default()
            },
            Modal::ConfirmUnmark { nombre, .. } => ModalView {
                show_confirm: true,
                nombre: nombre.clone(),
                mensaje,
                ..ModalView::default()
            },
        }
    }
}

#[derive(Template)]
#[template(path = "lista.html")]
pub struct ListaTemplate {
    pub ctx: PageContext,
    pub busqueda: String,
    pub rows: Vec<ParticipantRow>,
    pub summary: ListSummary,
    pub modal: ModalView,
    pub colores: Vec<ColorOption>,
    pub departamentos: Vec<SelectOption>,
    pub tipos: Vec<SelectOption>,
    pub draft_nombre: String,
    pub draft_telefono: String,
}

impl ListaTemplate {
    pub fn departamento_choices(current: &str) -> Vec<SelectOption> {
        SelectOption::list(Departamento::ALL.iter().map(|d| d.as_str()), current)
    }

    pub fn tipo_choices(current: &str) -> Vec<SelectOption> {
        SelectOption::list(Tipo::ALL.iter().map(|t| t.as_str()), current)
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub metrics: Metrics,
    pub por_departamento: Vec<Breakdown>,
}

#[derive(Template)]
#[template(path = "reportes.html")]
pub struct ReportesTemplate {
    pub ctx: PageContext,
    pub rows: Vec<ParticipantRow>,
    pub tipos: Vec<SelectOption>,
    pub departamentos: Vec<SelectOption>,
    pub asistencias: Vec<SelectOption>,
    pub busqueda: String,
    pub export_query: String,
}

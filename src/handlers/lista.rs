use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::errors::{AppError, render};
use crate::models::participant::ParticipantForm;
use crate::models::participant::phone::format_phone_input;
use crate::session::{load_view_state, save_view_state, take_add_draft};
use crate::templates_structs::{ColorOption, ListaTemplate, ModalView, PageContext, rows};
use crate::viewmodel::{AttendanceViewModel, Modal};

#[derive(Debug, Deserialize)]
pub struct ListaQuery {
    pub q: Option<String>,
}

/// GET /asistencia - roster with search box and whichever dialog is open.
/// A `q` parameter replaces the remembered search; without it the last one stays.
pub async fn index(
    vm: web::Data<AttendanceViewModel>,
    session: Session,
    query: web::Query<ListaQuery>,
) -> Result<HttpResponse, AppError> {
    let mut state = load_view_state(&session);
    if let Some(q) = &query.q {
        vm.set_search(&mut state, q);
        save_view_state(&session, &state)?;
    }

    let ctx = PageContext::build(&session, &vm, "lista");
    let draft = if state.modal == Modal::AddParticipant {
        take_add_draft(&session)
    } else {
        ParticipantForm::default()
    };

    let tmpl = ListaTemplate {
        ctx,
        busqueda: state.busqueda.clone(),
        rows: rows(&vm.visible(&state)),
        summary: vm.list_summary(&state),
        modal: ModalView::from(&state.modal),
        colores: ColorOption::palette(),
        departamentos: ListaTemplate::departamento_choices(&draft.departamento),
        tipos: ListaTemplate::tipo_choices(&draft.tipo),
        draft_nombre: draft.nombre,
        draft_telefono: format_phone_input(&draft.telefono),
    };
    render(tmpl)
}

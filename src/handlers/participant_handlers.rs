use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use super::{flash_failure, redirect};
use crate::errors::AppError;
use crate::models::participant::{Color, ParticipantForm};
use crate::session::{keep_add_draft, load_view_state, save_view_state, set_flash};
use crate::viewmodel::{AttendanceViewModel, Modal, NoticeLevel, messages};

const LIST: &str = "/asistencia";

#[derive(Debug, Deserialize)]
pub struct ColorForm {
    #[serde(default)]
    pub color: String,
}

pub async fn open_add(
    vm: web::Data<AttendanceViewModel>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let mut state = load_view_state(&session);
    vm.open_add(&mut state);
    save_view_state(&session, &state)?;
    Ok(redirect(LIST))
}

/// POST /participantes - submit the add dialog. On failure the dialog stays
/// open and the typed values are kept for the next render.
pub async fn create(
    vm: web::Data<AttendanceViewModel>,
    session: Session,
    form: web::Form<ParticipantForm>,
) -> Result<HttpResponse, AppError> {
    let mut state = load_view_state(&session);
    let form = form.into_inner();

    match vm.submit_add(&mut state, &form).await {
        Ok(_) => set_flash(&session, NoticeLevel::Success, messages::PARTICIPANTE_AGREGADO),
        Err(e) => {
            state.modal = Modal::AddParticipant;
            keep_add_draft(&session, &form);
            flash_failure(&session, &e, messages::ERROR_AGREGAR);
        }
    }

    save_view_state(&session, &state)?;
    Ok(redirect(LIST))
}

/// POST /participantes/{id}/marcar - open the color picker.
pub async fn begin_mark(
    vm: web::Data<AttendanceViewModel>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let mut state = load_view_state(&session);
    if let Err(e) = vm.begin_mark(&mut state, &id) {
        flash_failure(&session, &e, messages::ERROR_MARCAR);
    }
    save_view_state(&session, &state)?;
    Ok(redirect(LIST))
}

/// POST /marcar/color - finish the pending mark with the picked color.
pub async fn choose_color(
    vm: web::Data<AttendanceViewModel>,
    session: Session,
    form: web::Form<ColorForm>,
) -> Result<HttpResponse, AppError> {
    let mut state = load_view_state(&session);

    let Some(color) = Color::from_value(&form.color) else {
        set_flash(&session, NoticeLevel::Error, messages::COLOR_INVALIDO);
        return Ok(redirect(LIST));
    };

    match vm.choose_color(&mut state, color).await {
        Ok(()) => set_flash(&session, NoticeLevel::Success, messages::ASISTENCIA_MARCADA),
        Err(e) => flash_failure(&session, &e, messages::ERROR_MARCAR),
    }

    save_view_state(&session, &state)?;
    Ok(redirect(LIST))
}

/// POST /participantes/{id}/desmarcar - ask before removing attendance.
pub async fn request_unmark(
    vm: web::Data<AttendanceViewModel>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let mut state = load_view_state(&session);
    if let Err(e) = vm.request_unmark(&mut state, &id) {
        flash_failure(&session, &e, messages::ERROR_DESMARCAR);
    }
    save_view_state(&session, &state)?;
    Ok(redirect(LIST))
}

pub async fn confirm_unmark(
    vm: web::Data<AttendanceViewModel>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let mut state = load_view_state(&session);
    match vm.confirm_unmark(&mut state).await {
        Ok(()) => set_flash(&session, NoticeLevel::Success, messages::ASISTENCIA_ELIMINADA),
        Err(e) => flash_failure(&session, &e, messages::ERROR_DESMARCAR),
    }
    save_view_state(&session, &state)?;
    Ok(redirect(LIST))
}

pub async fn cancel(
    vm: web::Data<AttendanceViewModel>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let mut state = load_view_state(&session);
    vm.cancel(&mut state);
    save_view_state(&session, &state)?;
    Ok(redirect(LIST))
}

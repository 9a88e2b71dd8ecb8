pub mod api_v1;
pub mod dashboard;
pub mod lista;
pub mod live_ws;
pub mod participant_handlers;
pub mod reportes;

use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::session::set_flash;
use crate::viewmodel::{NoticeLevel, ViewModelError, messages};

/// Register every page, JSON and WebSocket route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(|| async { redirect("/asistencia") }))
        // Roster
        .route("/asistencia", web::get().to(lista::index))
        // Participant actions; /participantes/nuevo BEFORE /participantes/{id}
        .route("/participantes/nuevo", web::post().to(participant_handlers::open_add))
        .route("/participantes", web::post().to(participant_handlers::create))
        .route("/participantes/{id}/marcar", web::post().to(participant_handlers::begin_mark))
        .route("/participantes/{id}/desmarcar", web::post().to(participant_handlers::request_unmark))
        .route("/marcar/color", web::post().to(participant_handlers::choose_color))
        .route("/desmarcar/confirmar", web::post().to(participant_handlers::confirm_unmark))
        .route("/modal/cancelar", web::post().to(participant_handlers::cancel))
        // Dashboard and reports
        .route("/dashboard", web::get().to(dashboard::index))
        .route("/reportes", web::get().to(reportes::index))
        .route("/reportes/export.csv", web::get().to(reportes::export))
        // Live updates
        .route("/ws", web::get().to(live_ws::ws_connect))
        .service(web::scope("/api/v1").configure(api_v1::configure));
}

pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish()
}

/// Flash the user-facing text for a failed action. Store failures get the
/// generic `fallback`; the underlying error is already logged.
pub(crate) fn flash_failure(session: &Session, err: &ViewModelError, fallback: &str) {
    let message = match err {
        ViewModelError::Store(_) => fallback.to_string(),
        ViewModelError::NotFound(_) => messages::PARTICIPANTE_NO_ENCONTRADO.to_string(),
        other => other.to_string(),
    };
    set_flash(session, NoticeLevel::Error, message);
}

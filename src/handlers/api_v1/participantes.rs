use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::participant::{Color, Participant, ParticipantForm};
use crate::viewmodel::{AttendanceViewModel, SyncMode, ViewModelError, ViewState};

#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct ParticipantList {
    pub mostrando: usize,
    pub total: usize,
    pub participantes: Vec<Participant>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Body of `PUT /api/v1/participantes/{id}/asistencia`.
#[derive(Debug, Deserialize)]
pub struct AttendanceRequest {
    pub asistencia: String,
    #[serde(default)]
    pub color: Option<String>,
    /// Required for unmarking; the page flow asks the same question in a dialog.
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct EstadoResponse {
    pub ready: bool,
    pub sync_error: Option<String>,
    pub mode: &'static str,
}

fn error_json(status: actix_web::http::StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ApiErrorResponse {
        error: message.into(),
    })
}

/// Maps user-correctable failures to JSON 4xx; store failures go through `AppError`.
fn failure(err: ViewModelError) -> Result<HttpResponse, AppError> {
    use actix_web::http::StatusCode;
    match err {
        ViewModelError::Validation(e) => Ok(error_json(StatusCode::BAD_REQUEST, e.to_string())),
        e @ ViewModelError::NotFound(_) => Ok(error_json(StatusCode::NOT_FOUND, e.to_string())),
        e @ ViewModelError::NoPendingAction => Ok(error_json(StatusCode::CONFLICT, e.to_string())),
        other => Err(other.into()),
    }
}

/// GET /api/v1/participantes?q= - sorted roster, optionally searched.
pub async fn list(
    vm: web::Data<AttendanceViewModel>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
    let participantes = vm.search(&query.q);
    Ok(HttpResponse::Ok().json(ParticipantList {
        mostrando: participantes.len(),
        total: vm.roster().len(),
        participantes,
    }))
}

pub async fn read(
    vm: web::Data<AttendanceViewModel>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    match vm.find(&id) {
        Some(p) => Ok(HttpResponse::Ok().json(p)),
        None => failure(ViewModelError::NotFound(id)),
    }
}

/// POST /api/v1/participantes - same validation as the add dialog.
pub async fn create(
    vm: web::Data<AttendanceViewModel>,
    body: web::Json<ParticipantForm>,
) -> Result<HttpResponse, AppError> {
    match vm.add_participant(&body).await {
        Ok(id) => Ok(HttpResponse::Created().json(serde_json::json!({ "id": id }))),
        Err(e) => failure(e),
    }
}

/// PUT /api/v1/participantes/{id}/asistencia
pub async fn update_asistencia(
    vm: web::Data<AttendanceViewModel>,
    path: web::Path<String>,
    body: web::Json<AttendanceRequest>,
) -> Result<HttpResponse, AppError> {
    use actix_web::http::StatusCode;

    let id = path.into_inner();
    let body = body.into_inner();

    match body.asistencia.as_str() {
        "Activo" => {
            let color = match body.color.as_deref() {
                None | Some("") => None,
                Some(value) => match Color::from_value(value) {
                    Some(c) => Some(c),
                    None => {
                        return Ok(error_json(
                            StatusCode::BAD_REQUEST,
                            format!("Color desconocido: {value}"),
                        ));
                    }
                },
            };
            if let Err(e) = vm.mark(&id, color).await {
                return failure(e);
            }
        }
        "No Activo" => {
            if !body.confirm {
                return Ok(error_json(
                    StatusCode::BAD_REQUEST,
                    "Se requiere confirm: true para eliminar la asistencia",
                ));
            }
            let mut state = ViewState::default();
            if let Err(e) = vm.request_unmark(&mut state, &id) {
                return failure(e);
            }
            if let Err(e) = vm.confirm_unmark(&mut state).await {
                return failure(e);
            }
        }
        other => {
            return Ok(error_json(
                StatusCode::BAD_REQUEST,
                format!("Valor de asistencia desconocido: {other}"),
            ));
        }
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "id": id,
        "asistencia": body.asistencia,
    })))
}

/// GET /api/v1/metricas
pub async fn metricas(vm: web::Data<AttendanceViewModel>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(vm.metrics()))
}

/// GET /api/v1/estado - readiness of the roster mirror.
pub async fn estado(vm: web::Data<AttendanceViewModel>) -> Result<HttpResponse, AppError> {
    let mode = match vm.mode() {
        SyncMode::Subscribe => "subscribe",
        SyncMode::FetchOnce => "fetch",
    };
    Ok(HttpResponse::Ok().json(EstadoResponse {
        ready: vm.is_ready(),
        sync_error: vm.last_error(),
        mode,
    }))
}

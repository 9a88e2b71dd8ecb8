pub mod participantes;

use actix_web::{
    Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web,
};

/// Rejects POST/PUT/DELETE requests without `Content-Type: application/json`.
/// A plain cross-site form post cannot set that header. GET is exempt.
async fn require_json_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let method = req.method().clone();

    if method == actix_web::http::Method::POST
        || method == actix_web::http::Method::PUT
        || method == actix_web::http::Method::DELETE
    {
        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("application/json") {
            let body = serde_json::json!({
                "error": "Content-Type must be application/json for mutation requests"
            });
            let response = HttpResponse::BadRequest().json(body);
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// Configure API v1 routes (mounted under `/api/v1`).
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/participantes")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("", web::get().to(participantes::list))
            .route("", web::post().to(participantes::create))
            .route("/{id}", web::get().to(participantes::read))
            .route("/{id}/asistencia", web::put().to(participantes::update_asistencia)),
    )
    .route("/metricas", web::get().to(participantes::metricas))
    .route("/estado", web::get().to(participantes::estado));
}

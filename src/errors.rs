use actix_web::{HttpResponse, ResponseError};
use askama::Template;
use std::fmt;

use crate::models::participant::ValidationError;
use crate::store::StoreError;
use crate::viewmodel::ViewModelError;

#[derive(Debug)]
pub enum AppError {
    Store(StoreError),
    Validation(ValidationError),
    Template(askama::Error),
    Session(String),
    BadRequest(String),
    Internal(String),
    NotFound,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Store(e) => write!(f, "Store error: {e}"),
            AppError::Validation(e) => write!(f, "{e}"),
            AppError::Template(e) => write!(f, "Template error: {e}"),
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::BadRequest(e) => write!(f, "{e}"),
            AppError::Internal(e) => write!(f, "Internal error: {e}"),
            AppError::NotFound => write!(f, "Not found"),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound => HttpResponse::NotFound().body("Not Found"),
            AppError::Validation(_) | AppError::BadRequest(_) => {
                HttpResponse::BadRequest().body(self.to_string())
            }
            _ => {
                log::error!("{self}");
                HttpResponse::InternalServerError().body("Internal Server Error")
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Template(e)
    }
}

impl From<ViewModelError> for AppError {
    fn from(e: ViewModelError) -> Self {
        match e {
            ViewModelError::Validation(v) => AppError::Validation(v),
            ViewModelError::Store(s) => AppError::Store(s),
            ViewModelError::NotFound(_) => AppError::NotFound,
            ViewModelError::NoPendingAction | ViewModelError::EmptyExport => {
                AppError::BadRequest(e.to_string())
            }
            ViewModelError::Export(x) => AppError::Internal(x.to_string()),
        }
    }
}

/// Render an askama template into an HTML response.
pub fn render(tmpl: impl Template) -> Result<HttpResponse, AppError> {
    let html = tmpl.render()?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}

use actix_session::Session;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Local;

use super::redirect;
use crate::errors::{AppError, render};
use crate::models::participant::{FiltroAsistencia, ReportFilter, ReportQuery};
use crate::session::set_flash;
use crate::templates_structs::{PageContext, ReportesTemplate, SelectOption, rows};
use crate::viewmodel::{AttendanceViewModel, NoticeLevel, ViewModelError};

/// GET /reportes - filterable report over the whole roster.
pub async fn index(
    vm: web::Data<AttendanceViewModel>,
    session: Session,
    req: HttpRequest,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, &vm, "reportes");
    let filter = ReportFilter::from_query(&query);

    let tmpl = ReportesTemplate {
        ctx,
        rows: rows(&vm.report(&filter)),
        tipos: SelectOption::list(vm.tipo_options(), filter.tipo_value()),
        departamentos: SelectOption::list(vm.departamento_options(), filter.departamento_value()),
        asistencias: SelectOption::list(
            FiltroAsistencia::ALL.iter().map(|f| f.as_str()),
            filter.asistencia.as_str(),
        ),
        busqueda: filter.busqueda.clone(),
        export_query: req.query_string().to_string(),
    };
    render(tmpl)
}

/// GET /reportes/export.csv - download the filtered rows. An empty result is
/// refused with a notice instead of an empty file.
pub async fn export(
    vm: web::Data<AttendanceViewModel>,
    session: Session,
    req: HttpRequest,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    let filter = ReportFilter::from_query(&query);

    match vm.export(&filter, Local::now().date_naive()) {
        Ok(file) => {
            log::info!("Exported {} bytes as {}", file.bytes.len(), file.file_name);
            Ok(HttpResponse::Ok()
                .content_type("text/csv; charset=utf-8")
                .insert_header((
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", file.file_name),
                ))
                .body(file.bytes))
        }
        Err(e @ ViewModelError::EmptyExport) => {
            set_flash(&session, NoticeLevel::Error, e.to_string());
            let back = match req.query_string() {
                "" => "/reportes".to_string(),
                qs => format!("/reportes?{qs}"),
            };
            Ok(redirect(&back))
        }
        Err(e) => Err(e.into()),
    }
}

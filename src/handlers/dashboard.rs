use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::errors::{AppError, render};
use crate::templates_structs::{DashboardTemplate, PageContext};
use crate::viewmodel::AttendanceViewModel;

pub async fn index(
    vm: web::Data<AttendanceViewModel>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, &vm, "dashboard");
    let metrics = vm.metrics();
    let por_departamento = metrics.departamentos_ranked();

    render(DashboardTemplate {
        ctx,
        metrics,
        por_departamento,
    })
}

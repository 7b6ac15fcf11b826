use actix_web::{HttpResponse, web};
use chrono::Local;
use futures::join;
use tracing::warn;

use crate::{
    api::Screen,
    backend::HrBackend,
    error::AppError,
    model::dashboard::DashboardStats,
    utils::mock_data,
};

/* =========================
Dashboard counters
========================= */
#[utoipa::path(
    get,
    path = "/kiosk/dashboard",
    responses(
        (status = 200, description = "Home screen counters", body = Object, example = json!({
            "data": {
                "totalEmployees": 25,
                "presentToday": 18,
                "absentToday": 7,
                "totalPresences": 1247
            },
            "source": "backend"
        }))
    ),
    tag = "Dashboard"
)]
pub async fn dashboard(backend: web::Data<dyn HrBackend>) -> Result<HttpResponse, AppError> {
    let today = Local::now().date_naive();
    let (employees, stats) = join!(backend.list_employees(), backend.presence_stats(today));

    let screen = match (employees, stats) {
        (Ok(employees), Ok(stats)) => Screen::backend(DashboardStats {
            total_employees: employees.len() as u64,
            present_today: stats.presents_today,
            absent_today: stats.absents_today,
            total_presences: stats.total_presences,
        }),
        (Err(e), _) | (_, Err(e)) => {
            warn!(error = %e, "Dashboard falling back to demo data");
            Screen::fallback(mock_data::DASHBOARD_STATS.clone())
        }
    };
    Ok(HttpResponse::Ok().json(screen))
}

use actix_web::{HttpResponse, http::header, web};
use serde_json::json;
use tracing::info;

use crate::{
    api::{ColumnOrder, TableQuery, with_fallback},
    backend::HrBackend,
    error::AppError,
    model::salary::{SalaryBulletin, month_number},
    utils::mock_data,
};

/// Sortable bulletin columns, by wire name.
fn bulletin_order(column: &str) -> Option<ColumnOrder<SalaryBulletin>> {
    let order: ColumnOrder<SalaryBulletin> = match column {
        "employeeName" => |a, b| a.employee_name.cmp(&b.employee_name),
        "mois" => |a, b| month_number(&a.month).cmp(&month_number(&b.month)),
        "annee" => |a, b| a.year.cmp(&b.year),
        "salaireBase" => |a, b| a.base_salary.total_cmp(&b.base_salary),
        "salaireNet" => |a, b| a.net_salary.total_cmp(&b.net_salary),
        "dateGeneration" => |a, b| a.generated_on.cmp(&b.generated_on),
        _ => return None,
    };
    Some(order)
}

/* =========================
List bulletins
========================= */
#[utoipa::path(
    get,
    path = "/kiosk/salaries",
    params(TableQuery),
    responses(
        (status = 200, description = "Salary bulletins, demo data when the backend is down", body = Object, example = json!({
            "data": [{
                "id": 1,
                "employeeId": 1,
                "employeeName": "Jean Dupont",
                "mois": "Janvier",
                "annee": 2024,
                "salaireBase": 2500.0,
                "heuresTravaillees": 160.0,
                "heuresSupplementaires": 8.0,
                "deductions": 150.0,
                "salaireNet": 2420.0,
                "dateGeneration": "2024-01-31"
            }],
            "source": "backend",
            "page": 1,
            "per_page": 10,
            "total": 1
        })),
        (status = 400, description = "Unknown sort column", body = Object)
    ),
    tag = "Salary"
)]
pub async fn list_bulletins(
    backend: web::Data<dyn HrBackend>,
    query: web::Query<TableQuery>,
) -> Result<HttpResponse, AppError> {
    let needle = query.needle();
    let mut screen = with_fallback("salaries", backend.list_bulletins(), || {
        mock_data::BULLETINS.clone()
    })
    .await;

    let matching: Vec<SalaryBulletin> = std::mem::take(&mut screen.data)
        .into_iter()
        .map(SalaryBulletin::with_month_name)
        .filter(|b| {
            needle
                .as_deref()
                .is_none_or(|n| b.filter_haystack().contains(n))
        })
        .collect();
    let (data, paging) = query.arrange(matching, bulletin_order)?;

    Ok(HttpResponse::Ok().json(screen.page(data, paging)))
}

/* =========================
Salary stats
========================= */
#[utoipa::path(
    get,
    path = "/kiosk/salaries/stats",
    responses(
        (status = 200, description = "Payroll counters", body = Object, example = json!({
            "data": {
                "totalBulletins": 45,
                "totalSalaries": 112500.0,
                "averageSalary": 2500.0,
                "currentMonthBulletins": 12
            },
            "source": "backend"
        }))
    ),
    tag = "Salary"
)]
pub async fn salary_stats(backend: web::Data<dyn HrBackend>) -> Result<HttpResponse, AppError> {
    let screen = with_fallback("salary stats", backend.salary_stats(), || {
        mock_data::SALARY_STATS.clone()
    })
    .await;
    Ok(HttpResponse::Ok().json(screen))
}

/* =========================
Generate a bulletin
========================= */
#[utoipa::path(
    post,
    path = "/kiosk/salaries/generate/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Bulletin generated", body = Object, example = json!({
            "message": "Bulletin generated"
        })),
        (status = 404, description = "Employee not found", body = Object),
        (status = 502, description = "Backend refused or unreachable", body = Object)
    ),
    tag = "Salary"
)]
pub async fn generate_bulletin(
    backend: web::Data<dyn HrBackend>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();
    backend.generate_bulletin(employee_id).await?;
    info!(employee_id, "Bulletin generated");
    Ok(HttpResponse::Ok().json(json!({ "message": "Bulletin generated" })))
}

/* =========================
Calculate all salaries
========================= */
#[utoipa::path(
    post,
    path = "/kiosk/salaries/calculate-all",
    responses(
        (status = 200, description = "Salaries calculated", body = Object, example = json!({
            "message": "Salaries calculated for all employees"
        })),
        (status = 502, description = "Backend refused or unreachable", body = Object)
    ),
    tag = "Salary"
)]
pub async fn calculate_all(backend: web::Data<dyn HrBackend>) -> Result<HttpResponse, AppError> {
    backend.calculate_all().await?;
    info!("Salaries calculated for all employees");
    Ok(HttpResponse::Ok().json(json!({ "message": "Salaries calculated for all employees" })))
}

/* =========================
Bulletin PDF
========================= */
#[utoipa::path(
    get,
    path = "/kiosk/salaries/{bulletin_id}/pdf",
    params(("bulletin_id" = u64, Path, description = "Bulletin ID")),
    responses(
        (status = 200, description = "Bulletin as PDF", content_type = "application/pdf"),
        (status = 404, description = "Bulletin not found", body = Object)
    ),
    tag = "Salary"
)]
pub async fn bulletin_pdf(
    backend: web::Data<dyn HrBackend>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let bulletin_id = path.into_inner();
    let pdf = backend.bulletin_pdf(bulletin_id).await?;

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"bulletin-{bulletin_id}.pdf\""),
        ))
        .body(pdf))
}

/* =========================
Send a bulletin by email
========================= */
#[utoipa::path(
    post,
    path = "/kiosk/salaries/{bulletin_id}/send-email",
    params(("bulletin_id" = u64, Path, description = "Bulletin ID")),
    responses(
        (status = 200, description = "Bulletin sent", body = Object, example = json!({
            "message": "Bulletin sent by email"
        })),
        (status = 502, description = "Backend refused or unreachable", body = Object)
    ),
    tag = "Salary"
)]
pub async fn send_bulletin(
    backend: web::Data<dyn HrBackend>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let bulletin_id = path.into_inner();
    backend.send_bulletin(bulletin_id).await?;
    info!(bulletin_id, "Bulletin sent by email");
    Ok(HttpResponse::Ok().json(json!({ "message": "Bulletin sent by email" })))
}

#[cfg(test)]
mod tests {
    use crate::backend::fake::{FakeBackend, employee};
    use crate::model::salary::SalaryBulletin;
    use crate::test_support::{TestKiosk, request};
    use actix_web::{http::StatusCode, test};
    use chrono::NaiveDate;
    use serde_json::Value;

    fn bulletin(id: u64, name: &str, month: &str) -> SalaryBulletin {
        SalaryBulletin {
            id: Some(id),
            employee_id: id,
            employee_name: name.to_string(),
            month: month.to_string(),
            year: 2024,
            base_salary: 2000.0,
            worked_hours: 151.67,
            overtime_hours: 0.0,
            deductions: 100.0,
            net_salary: 1900.0,
            generated_on: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        }
    }

    #[actix_web::test]
    async fn test_months_named_and_filtered() {
        let backend = FakeBackend::new();
        *backend.bulletins.lock().unwrap() = vec![
            bulletin(1, "Jean Dupont", "03"),
            bulletin(2, "Marie Martin", "02"),
        ];
        let kiosk = TestKiosk::new(backend);
        let app = crate::kiosk_app!(kiosk);

        let resp = test::call_service(&app, request::get("/kiosk/salaries").to_request()).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"][0]["mois"], "Mars");
        assert_eq!(body["data"][1]["mois"], "Février");

        let resp = test::call_service(
            &app,
            request::get("/kiosk/salaries?filter=f%C3%A9vrier").to_request(),
        )
        .await;
        let body: Value = test::read_body_json(resp).await;
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["employeeName"], "Marie Martin");
    }

    #[actix_web::test]
    async fn test_sorted_by_month_and_paged() {
        let backend = FakeBackend::new();
        *backend.bulletins.lock().unwrap() = vec![
            bulletin(1, "Jean Dupont", "11"),
            bulletin(2, "Marie Martin", "02"),
            bulletin(3, "Paul Durand", "Avril"),
        ];
        let kiosk = TestKiosk::new(backend);
        let app = crate::kiosk_app!(kiosk);

        let resp = test::call_service(
            &app,
            request::get("/kiosk/salaries?sort=mois&per_page=2").to_request(),
        )
        .await;
        let body: Value = test::read_body_json(resp).await;
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["mois"], "Février");
        assert_eq!(data[1]["mois"], "Avril");
        assert_eq!(body["total"], 3);
        assert_eq!(body["per_page"], 2);

        let resp = test::call_service(
            &app,
            request::get("/kiosk/salaries?sort=mois&per_page=2&page=2").to_request(),
        )
        .await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"][0]["mois"], "Novembre");

        let resp = test::call_service(
            &app,
            request::get("/kiosk/salaries?sort=deductions").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_listing_fallbacks() {
        let kiosk = TestKiosk::new(FakeBackend::offline());
        let app = crate::kiosk_app!(kiosk);

        let resp = test::call_service(&app, request::get("/kiosk/salaries").to_request()).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["source"], "fallback");
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let resp = test::call_service(&app, request::get("/kiosk/salaries/stats").to_request()).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["totalBulletins"], 45);
        assert_eq!(body["data"]["currentMonthBulletins"], 12);
    }

    #[actix_web::test]
    async fn test_actions_report_backend_failures() {
        let kiosk = TestKiosk::new(FakeBackend::offline());
        let app = crate::kiosk_app!(kiosk);

        for uri in [
            "/kiosk/salaries/generate/1",
            "/kiosk/salaries/calculate-all",
            "/kiosk/salaries/3/send-email",
        ] {
            let resp = test::call_service(&app, request::post(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_GATEWAY, "{uri}");
            let body: Value = test::read_body_json(resp).await;
            assert!(body["message"].as_str().unwrap().contains("unavailable"));
        }
    }

    #[actix_web::test]
    async fn test_actions() {
        let kiosk = TestKiosk::new(FakeBackend::with_employees(vec![employee(
            1, "EMP001", "Jean", "Dupont",
        )]));
        let app = crate::kiosk_app!(kiosk);

        let resp = test::call_service(
            &app,
            request::post("/kiosk/salaries/generate/1").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = test::call_service(
            &app,
            request::post("/kiosk/salaries/generate/9").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = test::call_service(&app, request::get("/kiosk/salaries/5/pdf").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("content-type").unwrap(), "application/pdf");
        let body = test::read_body(resp).await;
        assert!(body.starts_with(b"%PDF"));

        assert!(kiosk.backend.calls().contains(&"bulletin_pdf 5".to_string()));
    }
}

use actix_web::{HttpResponse, http::header, web};
use chrono::Local;
use serde_json::json;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    api::{Screen, with_fallback},
    backend::{BackendError, HrBackend},
    error::AppError,
    model::employee::{Employee, EmployeeForm},
    utils::{employee_directory::EmployeeDirectory, mock_data, qr_cache::QrCache},
};

const KEPT_LOCALLY: &str = "Backend unreachable, change kept locally";

fn validated(form: EmployeeForm) -> Result<EmployeeForm, AppError> {
    form.validate()
        .map_err(|e| AppError::validation(&e, EmployeeForm::wire_name))?;
    Ok(form)
}

/* =========================
List employees
========================= */
#[utoipa::path(
    get,
    path = "/kiosk/employees",
    responses(
        (status = 200, description = "Employee list, demo data when the backend is down", body = Object, example = json!({
            "data": [{
                "id": 1,
                "matricule": "EMP001",
                "nom": "Dupont",
                "prenom": "Jean",
                "email": "jean.dupont@email.com",
                "poste": "Développeur",
                "salaireBase": 2500.0,
                "dateEmbauche": "2023-01-15"
            }],
            "source": "backend"
        }))
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    backend: web::Data<dyn HrBackend>,
    directory: web::Data<EmployeeDirectory>,
) -> Result<HttpResponse, AppError> {
    let screen = with_fallback("employees", backend.list_employees(), || {
        mock_data::EMPLOYEES.clone()
    })
    .await;
    directory.replace(screen.data.clone());
    Ok(HttpResponse::Ok().json(screen))
}

/* =========================
Get employee
========================= */
#[utoipa::path(
    get,
    path = "/kiosk/employees/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = Object),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Not found: employee 9"
        }))
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    backend: web::Data<dyn HrBackend>,
    directory: web::Data<EmployeeDirectory>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();

    match backend.get_employee(employee_id).await {
        Ok(employee) => Ok(HttpResponse::Ok().json(Screen::backend(employee))),
        Err(e) if e.is_outage() => match directory.get(employee_id) {
            Some(employee) => Ok(HttpResponse::Ok().json(Screen::local(
                employee,
                "Backend unreachable, showing the last known data",
            ))),
            None => Err(e.into()),
        },
        Err(e) => Err(e.into()),
    }
}

/* =========================
Create employee
========================= */
#[utoipa::path(
    post,
    path = "/kiosk/employees",
    request_body = EmployeeForm,
    responses(
        (status = 201, description = "Employee created", body = Object),
        (status = 422, description = "Form validation failed", body = Object, example = json!({
            "message": "Validation failed",
            "errors": { "matricule": ["matricule must be at least 3 characters"] }
        }))
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    backend: web::Data<dyn HrBackend>,
    directory: web::Data<EmployeeDirectory>,
    payload: web::Json<EmployeeForm>,
) -> Result<HttpResponse, AppError> {
    let form = validated(payload.into_inner())?;
    let employee = form.into_employee(None, None);

    match backend.create_employee(&employee).await {
        Ok(created) => {
            info!(matricule = %created.matricule, "Employee created");
            directory.upsert(created.clone());
            Ok(HttpResponse::Created().json(Screen::backend(created)))
        }
        Err(e) if e.is_outage() => {
            warn!(error = %e, matricule = %employee.matricule, "Creating employee locally");
            let local = Employee {
                id: Some(directory.next_id()),
                hire_date: Some(Local::now().date_naive()),
                ..employee
            };
            directory.upsert(local.clone());
            Ok(HttpResponse::Created().json(Screen::local(local, KEPT_LOCALLY)))
        }
        Err(e) => Err(e.into()),
    }
}

/* =========================
Update employee
========================= */
#[utoipa::path(
    put,
    path = "/kiosk/employees/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    request_body = EmployeeForm,
    responses(
        (status = 200, description = "Employee updated", body = Object),
        (status = 404, description = "Employee not found", body = Object),
        (status = 422, description = "Form validation failed", body = Object)
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    backend: web::Data<dyn HrBackend>,
    directory: web::Data<EmployeeDirectory>,
    qr_cache: web::Data<QrCache>,
    path: web::Path<u64>,
    payload: web::Json<EmployeeForm>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();
    let form = validated(payload.into_inner())?;
    let known = directory.get(employee_id);
    let employee = form.into_employee(
        Some(employee_id),
        known.as_ref().and_then(|e| e.hire_date),
    );

    match backend.update_employee(employee_id, &employee).await {
        Ok(updated) => {
            qr_cache.invalidate(employee_id).await;
            directory.upsert(updated.clone());
            Ok(HttpResponse::Ok().json(Screen::backend(updated)))
        }
        Err(e) if e.is_outage() => match known {
            Some(_) => {
                warn!(error = %e, employee_id, "Updating employee locally");
                directory.upsert(employee.clone());
                Ok(HttpResponse::Ok().json(Screen::local(employee, KEPT_LOCALLY)))
            }
            None => Err(BackendError::NotFound(format!("employee {employee_id}")).into()),
        },
        Err(e) => Err(e.into()),
    }
}

/* =========================
Delete employee
========================= */
#[utoipa::path(
    delete,
    path = "/kiosk/employees/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 404, description = "Employee not found", body = Object)
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    backend: web::Data<dyn HrBackend>,
    directory: web::Data<EmployeeDirectory>,
    qr_cache: web::Data<QrCache>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();

    match backend.delete_employee(employee_id).await {
        Ok(()) => {
            directory.remove(employee_id);
            qr_cache.invalidate(employee_id).await;
            Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
        }
        Err(e) if e.is_outage() => {
            warn!(error = %e, employee_id, "Deleting employee locally");
            directory.remove(employee_id);
            Ok(HttpResponse::Ok().json(json!({
                "message": "Successfully deleted",
                "notice": KEPT_LOCALLY,
            })))
        }
        Err(e) => Err(e.into()),
    }
}

/* =========================
Employee QR code
========================= */
#[utoipa::path(
    get,
    path = "/kiosk/employees/{employee_id}/qrcode",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "QR code image", content_type = "image/png"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn employee_qrcode(
    backend: web::Data<dyn HrBackend>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();
    let png = backend.employee_qr_png(employee_id).await?;

    Ok(HttpResponse::Ok()
        .content_type("image/png")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"qrcode-{employee_id}.png\""),
        ))
        .body(png))
}

#[utoipa::path(
    get,
    path = "/kiosk/employees/{employee_id}/qrcode/base64",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Base64 encoded PNG", content_type = "text/plain"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn employee_qrcode_base64(
    backend: web::Data<dyn HrBackend>,
    qr_cache: web::Data<QrCache>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();
    let encoded = qr_cache
        .get_or_fetch(employee_id, backend.get_ref())
        .await?;
    Ok(HttpResponse::Ok().content_type("text/plain").body(encoded))
}

use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    backend::HrBackend,
    error::AppError,
    model::presence::PointageKind,
    scanner::{
        Scanner, ScannerStatus, SubmitOutcome,
        notice::{Notice, NoticeKind},
        session::SessionSnapshot,
    },
};

pub const FILE_NAME_HEADER: &str = "x-file-name";

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct StartScan {
    #[serde(default)]
    pub intent: PointageKind,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualEntry {
    #[validate(range(min = 1, message = "employeeId must be positive"))]
    pub employee_id: u64,
}

impl ManualEntry {
    fn wire_name(field: &str) -> &str {
        match field {
            "employee_id" => "employeeId",
            other => other,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PointageRequest {
    #[validate(length(min = 3, message = "matricule must be at least 3 characters"))]
    #[schema(example = "EMP001")]
    pub matricule: String,
    #[serde(default)]
    pub type_pointage: PointageKind,
}

impl PointageRequest {
    fn wire_name(field: &str) -> &str {
        match field {
            "type_pointage" => "typePointage",
            other => other,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResult {
    pub matricule: String,
}

/* =========================
Scan session
========================= */
#[utoipa::path(
    get,
    path = "/kiosk/scanner/session",
    responses(
        (status = 200, description = "Camera and session state with the latest notice", body = ScannerStatus)
    ),
    tag = "Scanner"
)]
pub async fn session_status(scanner: web::Data<Scanner>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(scanner.status().await))
}

#[utoipa::path(
    post,
    path = "/kiosk/scanner/session",
    request_body(content = StartScan, description = "Optional, the intent defaults to ENTREE"),
    responses(
        (status = 200, description = "Session running", body = SessionSnapshot),
        (status = 503, description = "No camera on this device", body = Object, example = json!({
            "message": "The camera is not available on this device"
        }))
    ),
    tag = "Scanner"
)]
pub async fn start_session(
    scanner: web::Data<Scanner>,
    payload: Option<web::Json<StartScan>>,
) -> Result<HttpResponse, AppError> {
    let intent = payload.map(|p| p.into_inner().intent).unwrap_or_default();
    let snapshot = scanner.start(intent).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[utoipa::path(
    delete,
    path = "/kiosk/scanner/session",
    responses(
        (status = 200, description = "Session stopped, or nothing was running", body = Object, example = json!({
            "stopped": true
        }))
    ),
    tag = "Scanner"
)]
pub async fn stop_session(scanner: web::Data<Scanner>) -> Result<HttpResponse, AppError> {
    let stopped = scanner.stop().await;
    Ok(HttpResponse::Ok().json(json!({ "stopped": stopped })))
}

#[utoipa::path(
    post,
    path = "/kiosk/scanner/session/manual",
    request_body = ManualEntry,
    responses(
        (status = 202, description = "Entry accepted, the outcome shows up as a notice", body = Object, example = json!({
            "outcome": "accepted"
        })),
        (status = 409, description = "No session running, or a scan is still being recorded", body = Object, example = json!({
            "outcome": "busy"
        }))
    ),
    tag = "Scanner"
)]
pub async fn manual_entry(
    scanner: web::Data<Scanner>,
    payload: web::Json<ManualEntry>,
) -> Result<HttpResponse, AppError> {
    let entry = payload.into_inner();
    entry
        .validate()
        .map_err(|e| AppError::validation(&e, ManualEntry::wire_name))?;

    let outcome = scanner.manual_entry(entry.employee_id).await;
    let body = json!({ "outcome": outcome });
    Ok(match outcome {
        SubmitOutcome::Accepted => HttpResponse::Accepted().json(body),
        SubmitOutcome::Busy | SubmitOutcome::NoSession => HttpResponse::Conflict().json(body),
    })
}

#[utoipa::path(
    get,
    path = "/kiosk/scanner/notices",
    responses(
        (status = 200, description = "Recent operator notices, oldest first", body = [Notice])
    ),
    tag = "Scanner"
)]
pub async fn notices(scanner: web::Data<Scanner>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(scanner.feed().recent()))
}

/* =========================
File scan
========================= */
#[utoipa::path(
    post,
    path = "/kiosk/scanner/upload",
    request_body(content = String, content_type = "application/octet-stream", description = "Raw badge image"),
    params(("x-file-name" = Option<String>, Header, description = "Original file name")),
    responses(
        (status = 200, description = "Matricule read from the image", body = UploadResult),
        (status = 400, description = "Empty upload, or no QR code in the image", body = Object)
    ),
    tag = "Scanner"
)]
pub async fn upload(
    backend: web::Data<dyn HrBackend>,
    scanner: web::Data<Scanner>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    if body.is_empty() {
        return Err(AppError::BadRequest("Select an image to scan".to_string()));
    }
    let file_name = req
        .headers()
        .get(FILE_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("badge.png")
        .to_string();

    match backend.scan_qr(body.to_vec(), &file_name).await {
        Ok(matricule) => {
            scanner
                .feed()
                .push(NoticeKind::Success, format!("QR code read: {matricule}"));
            Ok(HttpResponse::Ok().json(UploadResult { matricule }))
        }
        Err(e) => {
            warn!(error = %e, %file_name, "Uploaded image could not be decoded");
            scanner
                .feed()
                .push(NoticeKind::Error, "Could not read a QR code from this image");
            Err(e.into())
        }
    }
}

#[utoipa::path(
    post,
    path = "/kiosk/scanner/pointage",
    request_body = PointageRequest,
    responses(
        (status = 200, description = "Pointage recorded", body = Object, example = json!({
            "message": "ENTREE recorded for EMP001"
        })),
        (status = 422, description = "Form validation failed", body = Object),
        (status = 502, description = "Backend refused or unreachable", body = Object)
    ),
    tag = "Scanner"
)]
pub async fn pointage(
    scanner: web::Data<Scanner>,
    payload: web::Json<PointageRequest>,
) -> Result<HttpResponse, AppError> {
    let mut request = payload.into_inner();
    request.matricule = request.matricule.trim().to_string();
    request
        .validate()
        .map_err(|e| AppError::validation(&e, PointageRequest::wire_name))?;

    let matricule = request.matricule.as_str();
    match scanner
        .recorder()
        .record_pointage(matricule, request.type_pointage)
        .await
    {
        Ok(()) => {
            let message = format!("{} recorded for {matricule}", request.type_pointage);
            scanner.feed().push(NoticeKind::Success, message.clone());
            Ok(HttpResponse::Ok().json(json!({ "message": message })))
        }
        Err(e) => {
            scanner
                .feed()
                .push(NoticeKind::Error, "Failed to record the pointage");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FILE_NAME_HEADER;
    use crate::backend::fake::{FakeBackend, employee};
    use crate::model::presence::PointageKind;
    use crate::scanner::testing::{FakeCamera, ScriptedDecoder};
    use crate::test_support::{TestKiosk, request};
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    fn roster() -> FakeBackend {
        FakeBackend::with_employees(vec![employee(7, "EMP007", "Ada", "Lovelace")])
    }

    #[actix_web::test]
    async fn test_session_start_status_stop() {
        let kiosk = TestKiosk::new(roster());
        let app = crate::kiosk_app!(kiosk);

        let resp = test::call_service(
            &app,
            request::post("/kiosk/scanner/session")
                .set_json(json!({ "intent": "SORTIE" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["intent"], "SORTIE");
        assert_eq!(body["scanning"], true);

        let resp = test::call_service(&app, request::get("/kiosk/scanner/session").to_request()).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["scanning"], true);
        assert_eq!(body["notice"]["message"], "Scanning...");
        assert_eq!(kiosk.camera.open_streams(), 1);

        let resp = test::call_service(&app, request::delete("/kiosk/scanner/session").to_request()).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["stopped"], true);
        assert_eq!(kiosk.camera.open_streams(), 0);

        let resp = test::call_service(&app, request::delete("/kiosk/scanner/session").to_request()).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["stopped"], false);
    }

    #[actix_web::test]
    async fn test_start_without_body_checks_in() {
        let kiosk = TestKiosk::new(roster());
        let app = crate::kiosk_app!(kiosk);

        let resp = test::call_service(&app, request::post("/kiosk/scanner/session").to_request()).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["intent"], "ENTREE");
        kiosk.scanner.shutdown().await;
    }

    #[actix_web::test]
    async fn test_missing_camera_is_503() {
        let kiosk = TestKiosk::with_parts(
            roster(),
            FakeCamera::unavailable(),
            ScriptedDecoder::never(),
        );
        let app = crate::kiosk_app!(kiosk);

        let resp = test::call_service(&app, request::post("/kiosk/scanner/session").to_request()).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], crate::scanner::CAMERA_UNAVAILABLE);
    }

    #[actix_web::test]
    async fn test_manual_entry_outcomes() {
        let kiosk = TestKiosk::new(roster());
        kiosk.backend.hold_records();
        let app = crate::kiosk_app!(kiosk);

        let manual = || {
            request::post("/kiosk/scanner/session/manual")
                .set_json(json!({ "employeeId": 7 }))
                .to_request()
        };

        let resp = test::call_service(&app, manual()).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["outcome"], "noSession");

        test::call_service(&app, request::post("/kiosk/scanner/session").to_request()).await;
        let resp = test::call_service(&app, manual()).await;
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        let resp = test::call_service(&app, manual()).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["outcome"], "busy");

        kiosk.scanner.shutdown().await;
        kiosk.backend.release_record();
    }

    #[actix_web::test]
    async fn test_upload_reads_matricule() {
        let backend = roster();
        *backend.scan_answer.lock().unwrap() = Some("EMP007".to_string());
        let kiosk = TestKiosk::new(backend);
        let app = crate::kiosk_app!(kiosk);

        let resp = test::call_service(
            &app,
            request::post("/kiosk/scanner/upload")
                .insert_header((FILE_NAME_HEADER, "ada.jpg"))
                .set_payload(vec![1u8, 2, 3])
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["matricule"], "EMP007");
        assert!(kiosk.backend.calls().contains(&"scan_qr ada.jpg 3".to_string()));

        let resp = test::call_service(&app, request::get("/kiosk/scanner/notices").to_request()).await;
        let body: Value = test::read_body_json(resp).await;
        let last = body.as_array().unwrap().last().unwrap().clone();
        assert_eq!(last["kind"], "success");
    }

    #[actix_web::test]
    async fn test_upload_failures_are_visible() {
        let kiosk = TestKiosk::new(roster());
        let app = crate::kiosk_app!(kiosk);

        let resp = test::call_service(&app, request::post("/kiosk/scanner/upload").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = test::call_service(
            &app,
            request::post("/kiosk/scanner/upload")
                .set_payload(vec![0u8; 8])
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            kiosk.scanner.feed().latest().unwrap().message,
            "Could not read a QR code from this image"
        );
    }

    #[actix_web::test]
    async fn test_pointage() {
        let kiosk = TestKiosk::new(roster());
        let app = crate::kiosk_app!(kiosk);

        let resp = test::call_service(
            &app,
            request::post("/kiosk/scanner/pointage")
                .set_json(json!({ "matricule": "EM" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(kiosk.backend.calls().is_empty());

        // padding does not count towards the minimum length
        let resp = test::call_service(
            &app,
            request::post("/kiosk/scanner/pointage")
                .set_json(json!({ "matricule": "  E" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["errors"]["matricule"].is_array());
        assert!(kiosk.backend.calls().is_empty());

        let resp = test::call_service(
            &app,
            request::post("/kiosk/scanner/pointage")
                .set_json(json!({ "matricule": " EMP007 ", "typePointage": "SORTIE" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            kiosk.backend.pointages.lock().unwrap().clone(),
            vec![("EMP007".to_string(), PointageKind::CheckOut)]
        );
        assert_eq!(
            kiosk.scanner.feed().latest().unwrap().message,
            "SORTIE recorded for EMP007"
        );
    }
}

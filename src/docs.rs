use crate::api::{
    DataSource, Paging, SortDirection,
    scanner::{ManualEntry, PointageRequest, StartScan, UploadResult},
};
use crate::model::{
    dashboard::DashboardStats,
    employee::{Employee, EmployeeForm},
    presence::{
        ManualPresenceForm, PointageKind, Presence, PresenceReceipt, PresenceStats, PresenceStatus,
    },
    salary::{SalaryBulletin, SalaryStats},
};
use crate::scanner::{
    ScannerStatus, SubmitOutcome,
    notice::{Notice, NoticeKind},
    session::SessionSnapshot,
};
use utoipa::OpenApi;

/// Prefix the handler annotations are written against.
const DOC_PREFIX: &str = "/kiosk";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Kiosk API",
        version = "0.1.0",
        description = r#"
## HRM attendance kiosk

Screen-facing API of the attendance kiosk. Every call is relayed to the HR backend.

### 🔹 Screens
- **Scanner**
  - Start and stop a camera scan session, type in an employee id, scan an uploaded badge image
- **Employees**
  - List, create, edit and delete employees, fetch their QR badge
- **Presences**
  - Attendance list with filters, daily counters, manual entry
- **Salaries**
  - Payroll bulletins, PDF export, email, bulk calculation
- **Dashboard**
  - Home screen counters

### 📦 Response Format
- Listing responses are wrapped as `{ "data", "source", "notice" }`
- Presence and salary tables add `page`, `per_page` and `total`, and take `sort`/`direction`
- `source` is `fallback` when the backend was unreachable and demo data is shown
- Errors are `{ "message" }`, plus `errors` per field for a failed form
"#,
    ),
    paths(
        crate::api::scanner::session_status,
        crate::api::scanner::start_session,
        crate::api::scanner::stop_session,
        crate::api::scanner::manual_entry,
        crate::api::scanner::notices,
        crate::api::scanner::upload,
        crate::api::scanner::pointage,

        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::create_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,
        crate::api::employee::employee_qrcode,
        crate::api::employee::employee_qrcode_base64,

        crate::api::presence::list_presences,
        crate::api::presence::presence_stats,
        crate::api::presence::create_presence,

        crate::api::salary::list_bulletins,
        crate::api::salary::salary_stats,
        crate::api::salary::generate_bulletin,
        crate::api::salary::calculate_all,
        crate::api::salary::bulletin_pdf,
        crate::api::salary::send_bulletin,

        crate::api::dashboard::dashboard
    ),
    components(
        schemas(
            DataSource,
            Paging,
            SortDirection,
            Employee,
            EmployeeForm,
            Presence,
            PresenceStatus,
            PresenceStats,
            PresenceReceipt,
            ManualPresenceForm,
            PointageKind,
            SalaryBulletin,
            SalaryStats,
            DashboardStats,
            ScannerStatus,
            SessionSnapshot,
            SubmitOutcome,
            Notice,
            NoticeKind,
            StartScan,
            ManualEntry,
            PointageRequest,
            UploadResult
        )
    ),
    tags(
        (name = "Scanner", description = "QR attendance scan session"),
        (name = "Employee", description = "Employee screen"),
        (name = "Presence", description = "Presence screen"),
        (name = "Salary", description = "Salary screen"),
        (name = "Dashboard", description = "Home screen counters"),
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// The document with every path mounted under `prefix`, as `routes::configure` does.
    pub fn for_prefix(prefix: &str) -> utoipa::openapi::OpenApi {
        let mut doc = Self::openapi();
        let prefix = prefix.trim_end_matches('/');
        doc.paths.paths = std::mem::take(&mut doc.paths.paths)
            .into_iter()
            .map(|(path, item)| match path.strip_prefix(DOC_PREFIX) {
                Some(rest) => (format!("{prefix}{rest}"), item),
                None => (path, item),
            })
            .collect();
        doc
    }
}

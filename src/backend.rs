//! Client side of the external HR backend.
//!
//! Every screen and the scan session talk to the backend through the
//! [`HrBackend`] trait so that tests can swap in an in-memory fake.

pub mod http;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{
    employee::Employee,
    presence::{NewPresence, PointageKind, Presence, PresenceReceipt, PresenceStats},
    salary::{SalaryBulletin, SalaryStats},
};

pub use http::HttpBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport failure, including an elapsed timeout
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// 400 from the backend
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },
}

impl BackendError {
    /// The backend could not serve the call at all, as opposed to refusing it.
    pub fn is_outage(&self) -> bool {
        match self {
            BackendError::Http(_) | BackendError::Unavailable(_) => true,
            BackendError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

#[async_trait]
pub trait HrBackend: Send + Sync {
    // employees
    async fn list_employees(&self) -> BackendResult<Vec<Employee>>;
    async fn get_employee(&self, id: u64) -> BackendResult<Employee>;
    async fn create_employee(&self, employee: &Employee) -> BackendResult<Employee>;
    async fn update_employee(&self, id: u64, employee: &Employee) -> BackendResult<Employee>;
    async fn delete_employee(&self, id: u64) -> BackendResult<()>;
    async fn employee_qr_png(&self, id: u64) -> BackendResult<Vec<u8>>;
    async fn employee_qr_base64(&self, id: u64) -> BackendResult<String>;

    /// Uploads an image and returns the matricule the backend read from it.
    async fn scan_qr(&self, image: Vec<u8>, file_name: &str) -> BackendResult<String>;

    // presences
    async fn record_pointage(&self, matricule: &str, kind: PointageKind) -> BackendResult<()>;
    async fn record_presence(&self, presence: &NewPresence) -> BackendResult<PresenceReceipt>;
    async fn list_presences(&self) -> BackendResult<Vec<Presence>>;
    async fn presence_stats(&self, date: NaiveDate) -> BackendResult<PresenceStats>;

    // salaries
    async fn list_bulletins(&self) -> BackendResult<Vec<SalaryBulletin>>;
    async fn salary_stats(&self) -> BackendResult<SalaryStats>;
    async fn generate_bulletin(&self, employee_id: u64) -> BackendResult<()>;
    async fn bulletin_pdf(&self, id: u64) -> BackendResult<Vec<u8>>;
    async fn send_bulletin(&self, id: u64) -> BackendResult<()>;
    async fn calculate_all(&self) -> BackendResult<()>;
}

//! reqwest implementation of [`HrBackend`].

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response, StatusCode, multipart};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::{BackendError, BackendResult, HrBackend};
use crate::config::Config;
use crate::model::{
    employee::Employee,
    presence::{NewPresence, PointageKind, Presence, PresenceReceipt, PresenceStats},
    salary::{SalaryBulletin, SalaryStats},
};

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &Config) -> BackendResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.backend_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(request: RequestBuilder) -> BackendResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), body = %body, "Backend call failed");
        Err(match status {
            StatusCode::NOT_FOUND => BackendError::NotFound(body),
            StatusCode::BAD_REQUEST => BackendError::Validation(body),
            StatusCode::SERVICE_UNAVAILABLE => BackendError::Unavailable(body),
            other => BackendError::Status {
                status: other.as_u16(),
                body,
            },
        })
    }

    async fn json<T: DeserializeOwned>(request: RequestBuilder) -> BackendResult<T> {
        let response = Self::send(request).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }

    async fn text(request: RequestBuilder) -> BackendResult<String> {
        Ok(Self::send(request).await?.text().await?)
    }

    async fn bytes(request: RequestBuilder) -> BackendResult<Vec<u8>> {
        Ok(Self::send(request).await?.bytes().await?.to_vec())
    }

    async fn status_only(request: RequestBuilder) -> BackendResult<()> {
        Self::send(request).await.map(|_| ())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> BackendResult<T> {
        Self::json(self.client.get(self.url(path))).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> BackendResult<T> {
        Self::json(self.client.post(self.url(path)).json(body)).await
    }

    async fn post_empty(&self, path: &str) -> BackendResult<()> {
        Self::status_only(self.client.post(self.url(path)).json(&serde_json::json!({}))).await
    }
}

#[async_trait]
impl HrBackend for HttpBackend {
    #[instrument(skip(self))]
    async fn list_employees(&self) -> BackendResult<Vec<Employee>> {
        self.get_json("employees").await
    }

    #[instrument(skip(self))]
    async fn get_employee(&self, id: u64) -> BackendResult<Employee> {
        self.get_json(&format!("employees/{id}")).await
    }

    #[instrument(skip(self, employee), fields(matricule = %employee.matricule))]
    async fn create_employee(&self, employee: &Employee) -> BackendResult<Employee> {
        self.post_json("employees", employee).await
    }

    #[instrument(skip(self, employee))]
    async fn update_employee(&self, id: u64, employee: &Employee) -> BackendResult<Employee> {
        Self::json(self.client.put(self.url(&format!("employees/{id}"))).json(employee)).await
    }

    #[instrument(skip(self))]
    async fn delete_employee(&self, id: u64) -> BackendResult<()> {
        Self::status_only(self.client.delete(self.url(&format!("employees/{id}")))).await
    }

    #[instrument(skip(self))]
    async fn employee_qr_png(&self, id: u64) -> BackendResult<Vec<u8>> {
        Self::bytes(self.client.get(self.url(&format!("employees/{id}/qrcode")))).await
    }

    #[instrument(skip(self))]
    async fn employee_qr_base64(&self, id: u64) -> BackendResult<String> {
        Self::text(self.client.get(self.url(&format!("employees/{id}/qrcode/base64")))).await
    }

    #[instrument(skip(self, image), fields(size = image.len()))]
    async fn scan_qr(&self, image: Vec<u8>, file_name: &str) -> BackendResult<String> {
        let part = multipart::Part::bytes(image).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);
        let matricule = Self::text(self.client.post(self.url("employees/scan")).multipart(form))
            .await?
            .trim()
            .to_string();
        debug!(%matricule, "Backend decoded QR code");
        Ok(matricule)
    }

    #[instrument(skip(self))]
    async fn record_pointage(&self, matricule: &str, kind: PointageKind) -> BackendResult<()> {
        let kind = kind.to_string();
        let request = self
            .client
            .post(self.url("presences/pointage"))
            .query(&[("matricule", matricule), ("typePointage", kind.as_str())]);
        Self::status_only(request).await
    }

    #[instrument(skip(self, presence), fields(employee_id = presence.employee_id))]
    async fn record_presence(&self, presence: &NewPresence) -> BackendResult<PresenceReceipt> {
        self.post_json("presences", presence).await
    }

    #[instrument(skip(self))]
    async fn list_presences(&self) -> BackendResult<Vec<Presence>> {
        self.get_json("presences").await
    }

    #[instrument(skip(self))]
    async fn presence_stats(&self, date: NaiveDate) -> BackendResult<PresenceStats> {
        let date = date.format("%Y-%m-%d").to_string();
        Self::json(
            self.client
                .get(self.url("presences/stats"))
                .query(&[("date", date.as_str())]),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn list_bulletins(&self) -> BackendResult<Vec<SalaryBulletin>> {
        self.get_json("salaries").await
    }

    #[instrument(skip(self))]
    async fn salary_stats(&self) -> BackendResult<SalaryStats> {
        self.get_json("salaries/stats").await
    }

    #[instrument(skip(self))]
    async fn generate_bulletin(&self, employee_id: u64) -> BackendResult<()> {
        self.post_empty(&format!("salaries/generate/{employee_id}")).await
    }

    #[instrument(skip(self))]
    async fn bulletin_pdf(&self, id: u64) -> BackendResult<Vec<u8>> {
        Self::bytes(self.client.get(self.url(&format!("salaries/{id}/pdf")))).await
    }

    #[instrument(skip(self))]
    async fn send_bulletin(&self, id: u64) -> BackendResult<()> {
        self.post_empty(&format!("salaries/{id}/send-email")).await
    }

    #[instrument(skip(self))]
    async fn calculate_all(&self) -> BackendResult<()> {
        self.post_empty("salaries/calculate-all").await
    }
}

use moka::future::Cache;
use std::time::Duration;
use tracing::debug;

use crate::backend::{BackendResult, HrBackend};

/// employee id => base64 PNG of the employee's QR code
#[derive(Clone)]
pub struct QrCache {
    inner: Cache<u64, String>,
}

impl QrCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Cached base64 QR code, fetched from the backend on a miss
    pub async fn get_or_fetch(&self, employee_id: u64, backend: &dyn HrBackend) -> BackendResult<String> {
        if let Some(hit) = self.inner.get(&employee_id).await {
            return Ok(hit);
        }

        let fetched = backend.employee_qr_base64(employee_id).await?;
        debug!(employee_id, "QR code cached");
        self.inner.insert(employee_id, fetched.clone()).await;
        Ok(fetched)
    }

    /// Drop the cached code, e.g. after the employee changed
    pub async fn invalidate(&self, employee_id: u64) {
        self.inner.invalidate(&employee_id).await;
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::camera::Frame;
use crate::backend::HrBackend;

/// Turns a frame into the text encoded in its QR code, if any.
#[async_trait]
pub trait FrameDecoder: Send + Sync {
    async fn decode(&self, frame: &Frame) -> Option<String>;
}

/// Delegates recognition to the backend's `/employees/scan` endpoint.
pub struct BackendDecoder {
    backend: Arc<dyn HrBackend>,
}

impl BackendDecoder {
    pub fn new(backend: Arc<dyn HrBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl FrameDecoder for BackendDecoder {
    async fn decode(&self, frame: &Frame) -> Option<String> {
        match self.backend.scan_qr(frame.data.clone(), &frame.file_name).await {
            Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                // most frames simply carry no code
                debug!(error = %e, frame = %frame.file_name, "No QR code recognised");
                None
            }
        }
    }
}

/// Employee id carried by a matricule such as `EMP007`.
///
/// The first `EMP` followed by at least one digit wins.
pub fn extract_employee_id(text: &str) -> Option<u64> {
    text.match_indices("EMP").find_map(|(start, marker)| {
        let rest = &text[start + marker.len()..];
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        rest[..end].parse().ok()
    })
}

/// Matricule for a numeric employee id, zero-padded to three digits.
pub fn matricule_for(employee_id: u64) -> String {
    format!("EMP{employee_id:03}")
}

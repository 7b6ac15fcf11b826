//! QR attendance check-in: capture → decode → record → feedback.

pub mod camera;
pub mod decoder;
pub mod notice;
pub mod recorder;
pub mod session;

#[cfg(test)]
pub mod testing;

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::model::presence::PointageKind;
use camera::Camera;
use decoder::{FrameDecoder, matricule_for};
use notice::{Notice, NoticeFeed, NoticeKind};
use recorder::PresenceRecorder;
use session::{AutoStop, Lifecycle, ScanSession, ScanSettings, SessionDeps, SessionSnapshot};

pub const CAMERA_UNAVAILABLE: &str = "The camera is not available on this device";

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("{}", CAMERA_UNAVAILABLE)]
    CameraUnavailable,

    #[error("Camera stream failed: {0}")]
    StreamFailed(String),
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScannerStatus {
    pub camera_available: bool,
    pub scanning: bool,
    pub session: Option<SessionSnapshot>,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SubmitOutcome {
    Accepted,
    /// A previous scan is still being recorded.
    Busy,
    NoSession,
}

/// Owner of the single scan session and the operator notice feed.
#[derive(Clone)]
pub struct Scanner {
    inner: Arc<ScannerInner>,
}

struct ScannerInner {
    camera: Arc<dyn Camera>,
    decoder: Arc<dyn FrameDecoder>,
    recorder: PresenceRecorder,
    feed: NoticeFeed,
    settings: ScanSettings,
    active: Mutex<Option<ScanSession>>,
}

impl Scanner {
    pub fn new(
        camera: Arc<dyn Camera>,
        decoder: Arc<dyn FrameDecoder>,
        recorder: PresenceRecorder,
        settings: ScanSettings,
    ) -> Self {
        Self {
            inner: Arc::new(ScannerInner {
                camera,
                decoder,
                recorder,
                feed: NoticeFeed::default(),
                settings,
                active: Mutex::new(None),
            }),
        }
    }

    pub fn feed(&self) -> &NoticeFeed {
        &self.inner.feed
    }

    pub fn recorder(&self) -> &PresenceRecorder {
        &self.inner.recorder
    }

    /// Probes the camera once at startup and tells the operator if there is none.
    pub fn initialize(&self) -> bool {
        let available = self.inner.camera.is_available();
        if !available {
            self.inner.feed.push(NoticeKind::Error, CAMERA_UNAVAILABLE);
        }
        available
    }

    /// Starts scanning, or returns the running session unchanged.
    pub async fn start(&self, intent: PointageKind) -> Result<SessionSnapshot, CaptureError> {
        let mut active = self.inner.active.lock().await;
        if let Some(session) = active.as_ref() {
            debug!(session = %session.id(), "Scan session already running");
            return Ok(session.snapshot());
        }

        let mut session = ScanSession::new(intent, self.session_deps());
        match session.initialize().await {
            Ok(()) => {
                self.inner.feed.push(NoticeKind::Info, "Scanning...");
                let snapshot = session.snapshot();
                *active = Some(session);
                Ok(snapshot)
            }
            Err(e) => {
                self.inner.feed.push(NoticeKind::Error, e.to_string());
                Err(e)
            }
        }
    }

    /// Stops the running session. Returns false when nothing was running.
    pub async fn stop(&self) -> bool {
        let mut active = self.inner.active.lock().await;
        match active.take() {
            Some(mut session) => {
                session.teardown().await;
                true
            }
            None => false,
        }
    }

    /// Stops the session only if it is still the one identified by `id`.
    async fn stop_session(&self, id: Uuid) {
        let mut active = self.inner.active.lock().await;
        if active.as_ref().is_some_and(|s| s.id() == id) {
            if let Some(mut session) = active.take() {
                session.teardown().await;
                info!(session = %id, "Scan session auto-stopped");
            }
        }
    }

    /// Typed-in employee id, handled like a scanned badge.
    pub async fn manual_entry(&self, employee_id: u64) -> SubmitOutcome {
        self.submit(matricule_for(employee_id)).await
    }

    pub async fn submit(&self, code: String) -> SubmitOutcome {
        let active = self.inner.active.lock().await;
        match active.as_ref() {
            None => SubmitOutcome::NoSession,
            Some(session) if session.submit(code) => SubmitOutcome::Accepted,
            Some(_) => SubmitOutcome::Busy,
        }
    }

    pub async fn status(&self) -> ScannerStatus {
        let session = self
            .inner
            .active
            .lock()
            .await
            .as_ref()
            .map(ScanSession::snapshot);
        ScannerStatus {
            camera_available: self.inner.camera.is_available(),
            scanning: session.as_ref().is_some_and(|s| s.scanning),
            session,
            notice: self.inner.feed.latest(),
        }
    }

    /// Teardown on service exit.
    pub async fn shutdown(&self) {
        if self.stop().await {
            info!("Scan session stopped on shutdown");
        }
    }

    fn session_deps(&self) -> SessionDeps {
        let weak = Arc::downgrade(&self.inner);
        let auto_stop: AutoStop = Arc::new(move |id| {
            let weak = weak.clone();
            tokio::spawn(async move {
                if let Some(inner) = weak.upgrade() {
                    Scanner { inner }.stop_session(id).await;
                }
            });
        });

        SessionDeps {
            camera: self.inner.camera.clone(),
            decoder: self.inner.decoder.clone(),
            recorder: self.inner.recorder.clone(),
            feed: self.inner.feed.clone(),
            settings: self.inner.settings,
            auto_stop,
        }
    }
}

//! One attendance scan: a camera stream sampled on a fixed interval until the
//! session is stopped.
//!
//! The sampling task owns the stream, so cancelling the session token and
//! awaiting that task is enough to release the camera. Every decode that
//! yields a matricule goes through [`ScanSession::submit`], which admits at
//! most one decode-to-backend sequence at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::CaptureError;
use super::camera::{Camera, Facing, VideoStream};
use super::decoder::{FrameDecoder, extract_employee_id};
use super::notice::{NoticeFeed, NoticeKind};
use super::recorder::PresenceRecorder;
use crate::model::employee::Employee;
use crate::model::presence::PointageKind;

/// Explicit init/teardown pair standing in for a UI component's lifecycle hooks.
#[async_trait]
pub trait Lifecycle {
    async fn initialize(&mut self) -> Result<(), CaptureError>;

    /// Must be safe to call repeatedly and before `initialize`.
    async fn teardown(&mut self);
}

#[derive(Debug, Clone, Copy)]
pub struct ScanSettings {
    pub interval: Duration,
    pub auto_stop_delay: Duration,
    pub facing: Facing,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            auto_stop_delay: Duration::from_secs(3),
            facing: Facing::Environment,
        }
    }
}

/// Called with the session id once a recorded presence should end the session.
pub type AutoStop = Arc<dyn Fn(Uuid) + Send + Sync>;

/// Collaborators a session needs, shared with its background tasks.
#[derive(Clone)]
pub struct SessionDeps {
    pub camera: Arc<dyn Camera>,
    pub decoder: Arc<dyn FrameDecoder>,
    pub recorder: PresenceRecorder,
    pub feed: NoticeFeed,
    pub settings: ScanSettings,
    pub auto_stop: AutoStop,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[schema(value_type = String, format = "uuid")]
    pub id: Uuid,
    pub intent: PointageKind,
    #[schema(value_type = String, format = "date-time")]
    pub started_at: DateTime<Local>,
    pub scanning: bool,
    pub processing: bool,
    pub last_decoded: Option<String>,
    pub employee: Option<Employee>,
}

#[derive(Default)]
struct Progress {
    last_decoded: Option<String>,
    employee: Option<Employee>,
}

struct SessionShared {
    id: Uuid,
    intent: PointageKind,
    processing: AtomicBool,
    progress: Mutex<Progress>,
    cancel: CancellationToken,
}

impl SessionShared {
    fn progress(&self) -> std::sync::MutexGuard<'_, Progress> {
        self.progress.lock().expect("session progress poisoned")
    }

    /// Claims the processing flag; false if a sequence is already in flight.
    fn try_claim(&self) -> bool {
        self.processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn release(&self) {
        self.processing.store(false, Ordering::Release);
    }
}

pub struct ScanSession {
    shared: Arc<SessionShared>,
    deps: SessionDeps,
    started_at: DateTime<Local>,
    sampler: Option<JoinHandle<()>>,
}

impl ScanSession {
    pub fn new(intent: PointageKind, deps: SessionDeps) -> Self {
        Self {
            shared: Arc::new(SessionShared {
                id: Uuid::new_v4(),
                intent,
                processing: AtomicBool::new(false),
                progress: Mutex::new(Progress::default()),
                cancel: CancellationToken::new(),
            }),
            deps,
            started_at: Local::now(),
            sampler: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn is_scanning(&self) -> bool {
        self.sampler.is_some() && !self.shared.cancel.is_cancelled()
    }

    /// Feeds decoded text into the session. Returns false when it was not
    /// admitted: the session has ended or another sequence is in flight.
    pub fn submit(&self, code: impl Into<String>) -> bool {
        submit(&self.shared, &self.deps, code.into())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let progress = self.shared.progress();
        SessionSnapshot {
            id: self.shared.id,
            intent: self.shared.intent,
            started_at: self.started_at,
            scanning: self.is_scanning(),
            processing: self.shared.processing.load(Ordering::Acquire),
            last_decoded: progress.last_decoded.clone(),
            employee: progress.employee.clone(),
        }
    }
}

#[async_trait]
impl Lifecycle for ScanSession {
    async fn initialize(&mut self) -> Result<(), CaptureError> {
        if self.sampler.is_some() {
            return Ok(());
        }
        if self.shared.cancel.is_cancelled() {
            return Err(CaptureError::StreamFailed("session already ended".to_string()));
        }
        if !self.deps.camera.is_available() {
            return Err(CaptureError::CameraUnavailable);
        }

        let stream = self.deps.camera.open(self.deps.settings.facing).await?;
        let handle = tokio::spawn(sample(self.shared.clone(), self.deps.clone(), stream));
        self.sampler = Some(handle);
        info!(
            session = %self.shared.id,
            intent = %self.shared.intent,
            facing = %self.deps.settings.facing,
            "Scan session started"
        );
        Ok(())
    }

    async fn teardown(&mut self) {
        {
            let _progress = self.shared.progress();
            self.shared.cancel.cancel();
        }
        if let Some(sampler) = self.sampler.take() {
            if let Err(e) = sampler.await {
                warn!(session = %self.shared.id, error = %e, "Sampling task ended abnormally");
            }
            info!(session = %self.shared.id, "Scan session stopped");
        }
        *self.shared.progress() = Progress::default();
        self.shared.release();
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        // the sampling task sees this and releases the stream on its own
        let _progress = self.shared.progress.lock();
        self.shared.cancel.cancel();
    }
}

async fn sample(shared: Arc<SessionShared>, deps: SessionDeps, mut stream: Box<dyn VideoStream>) {
    let mut ticker = interval(deps.settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // first tick completes immediately, sampling starts one period in
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = shared.cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        if shared.processing.load(Ordering::Acquire) {
            continue;
        }

        let frame = match stream.grab().await {
            Ok(Some(frame)) => frame,
            Ok(None) => continue,
            Err(e) => {
                warn!(session = %shared.id, error = %e, "Frame capture failed");
                continue;
            }
        };

        let decoded = tokio::select! {
            _ = shared.cancel.cancelled() => break,
            decoded = deps.decoder.decode(&frame) => decoded,
        };
        if let Some(code) = decoded {
            submit(&shared, &deps, code);
        }
    }

    stream.stop();
    debug!(session = %shared.id, "Sampling stopped");
}

fn submit(shared: &Arc<SessionShared>, deps: &SessionDeps, code: String) -> bool {
    if shared.cancel.is_cancelled() || !shared.try_claim() {
        return false;
    }

    shared.progress().last_decoded = Some(code.clone());

    match extract_employee_id(&code) {
        Some(employee_id) => {
            tokio::spawn(record(shared.clone(), deps.clone(), employee_id));
        }
        None => {
            deps.feed.push(NoticeKind::Error, format!("Invalid QR code: {code}"));
            shared.release();
        }
    }
    true
}

async fn record(shared: Arc<SessionShared>, deps: SessionDeps, employee_id: u64) {
    let outcome = deps.recorder.record(employee_id, shared.intent).await;

    if shared.cancel.is_cancelled() {
        debug!(session = %shared.id, employee_id, "Session ended before the backend answered, result discarded");
        return;
    }

    match outcome {
        Ok(receipt) => {
            let name = receipt.employee.display_name();
            {
                // teardown cancels under this lock, so nothing below leaks
                // into a stopped session
                let mut progress = shared.progress();
                if shared.cancel.is_cancelled() {
                    return;
                }
                progress.employee = Some(receipt.employee);
                deps.feed
                    .push(NoticeKind::Success, format!("Presence recorded for {name}"));
                shared.release();
            }

            tokio::select! {
                _ = shared.cancel.cancelled() => {}
                _ = sleep(deps.settings.auto_stop_delay) => (deps.auto_stop)(shared.id),
            }
        }
        Err(e) => {
            warn!(session = %shared.id, employee_id, error = %e, "Recording presence failed");
            let _progress = shared.progress();
            if shared.cancel.is_cancelled() {
                return;
            }
            deps.feed
                .push(NoticeKind::Error, "Failed to record presence, please scan again");
            shared.release();
        }
    }
}

//! Camera devices and the video streams they hand out.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use derive_more::Display;
use serde::Serialize;
use tracing::{debug, info};

use super::CaptureError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Back camera on phones and tablets.
    #[default]
    #[display(fmt = "environment")]
    Environment,
    #[display(fmt = "user")]
    User,
}

/// One sampled picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub file_name: String,
    pub data: Vec<u8>,
}

#[async_trait]
pub trait Camera: Send + Sync {
    /// Whether the platform exposes a camera at all.
    fn is_available(&self) -> bool;

    async fn open(&self, facing: Facing) -> Result<Box<dyn VideoStream>, CaptureError>;
}

#[async_trait]
pub trait VideoStream: Send {
    /// `Ok(None)` while no new picture is ready.
    async fn grab(&mut self) -> Result<Option<Frame>, CaptureError>;

    /// Releases the device. Further grabs return `Ok(None)`.
    fn stop(&mut self);
}

/// Stand-in for a platform without camera support.
pub struct NoCamera;

#[async_trait]
impl Camera for NoCamera {
    fn is_available(&self) -> bool {
        false
    }

    async fn open(&self, _facing: Facing) -> Result<Box<dyn VideoStream>, CaptureError> {
        Err(CaptureError::CameraUnavailable)
    }
}

/// Camera fed by a capture daemon that drops still images into a directory.
///
/// Each grab returns the newest image written since the previous grab.
pub struct SpoolCamera {
    dir: PathBuf,
}

impl SpoolCamera {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl Camera for SpoolCamera {
    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }

    async fn open(&self, facing: Facing) -> Result<Box<dyn VideoStream>, CaptureError> {
        if !self.is_available() {
            return Err(CaptureError::CameraUnavailable);
        }
        if facing != Facing::Environment {
            debug!(?facing, "spool camera has a single lens, ignoring facing");
        }
        info!(dir = %self.dir.display(), "Camera stream opened");
        Ok(Box::new(SpoolStream {
            dir: self.dir.clone(),
            // frames older than the session are never decoded
            last_seen: SystemTime::now(),
            stopped: false,
        }))
    }
}

struct SpoolStream {
    dir: PathBuf,
    last_seen: SystemTime,
    stopped: bool,
}

fn is_image(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("png" | "jpg" | "jpeg" | "bmp" | "webp")
    )
}

#[async_trait]
impl VideoStream for SpoolStream {
    async fn grab(&mut self) -> Result<Option<Frame>, CaptureError> {
        if self.stopped {
            return Ok(None);
        }

        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| CaptureError::StreamFailed(e.to_string()))?;

        let mut newest: Option<(SystemTime, PathBuf)> = None;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CaptureError::StreamFailed(e.to_string()))?
        {
            let path = entry.path();
            if !is_image(&path) {
                continue;
            }
            let Ok(modified) = entry.metadata().await.and_then(|m| m.modified()) else {
                continue;
            };
            if modified > self.last_seen && newest.as_ref().is_none_or(|(t, _)| modified > *t) {
                newest = Some((modified, path));
            }
        }

        let Some((modified, path)) = newest else {
            return Ok(None);
        };
        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| CaptureError::StreamFailed(e.to_string()))?;
        self.last_seen = modified;

        Ok(Some(Frame {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "frame.png".to_string()),
            data,
        }))
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            info!(dir = %self.dir.display(), "Camera stream released");
        }
    }
}

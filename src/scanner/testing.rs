//! Camera and decoder doubles for the scanner tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::CaptureError;
use super::camera::{Camera, Facing, Frame, VideoStream};
use super::decoder::FrameDecoder;

pub struct FakeCamera {
    available: bool,
    opened: AtomicUsize,
    live: Arc<AtomicUsize>,
}

impl Default for FakeCamera {
    fn default() -> Self {
        Self {
            available: true,
            opened: AtomicUsize::new(0),
            live: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl FakeCamera {
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::default()
        }
    }

    /// Streams opened and not yet stopped.
    pub fn open_streams(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Streams opened over the camera's lifetime.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Camera for FakeCamera {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn open(&self, _facing: Facing) -> Result<Box<dyn VideoStream>, CaptureError> {
        if !self.available {
            return Err(CaptureError::CameraUnavailable);
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeStream {
            live: self.live.clone(),
            stopped: false,
            frames: 0,
        }))
    }
}

struct FakeStream {
    live: Arc<AtomicUsize>,
    stopped: bool,
    frames: u32,
}

#[async_trait]
impl VideoStream for FakeStream {
    async fn grab(&mut self) -> Result<Option<Frame>, CaptureError> {
        if self.stopped {
            return Ok(None);
        }
        self.frames += 1;
        Ok(Some(Frame {
            file_name: format!("frame-{}.png", self.frames),
            data: vec![0; 16],
        }))
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

pub struct ScriptedDecoder {
    answer: Option<String>,
    /// Answers only the first decode when set.
    once: bool,
    pub decodes: AtomicUsize,
}

impl ScriptedDecoder {
    pub fn always(code: &str) -> Self {
        Self {
            answer: Some(code.to_string()),
            once: false,
            decodes: AtomicUsize::new(0),
        }
    }

    /// A single badge held in front of the lens, then taken away.
    pub fn once(code: &str) -> Self {
        Self {
            once: true,
            ..Self::always(code)
        }
    }

    pub fn never() -> Self {
        Self {
            answer: None,
            once: false,
            decodes: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl FrameDecoder for ScriptedDecoder {
    async fn decode(&self, _frame: &Frame) -> Option<String> {
        let previous = self.decodes.fetch_add(1, Ordering::SeqCst);
        if self.once && previous > 0 {
            return None;
        }
        self.answer.clone()
    }
}

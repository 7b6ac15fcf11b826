use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{error, info};
use utoipa::ToSchema;

const FEED_CAPACITY: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// A message shown to the operator, the kiosk's snackbar.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    #[schema(value_type = String, format = "date-time")]
    pub at: DateTime<Local>,
}

/// Most recent notices, newest last.
#[derive(Clone, Default)]
pub struct NoticeFeed {
    inner: Arc<Mutex<VecDeque<Notice>>>,
}

impl NoticeFeed {
    pub fn push(&self, kind: NoticeKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            NoticeKind::Error => error!(%message, "notice"),
            _ => info!(%message, "notice"),
        }

        let mut feed = self.inner.lock().expect("notice feed poisoned");
        if feed.len() == FEED_CAPACITY {
            feed.pop_front();
        }
        feed.push_back(Notice {
            kind,
            message,
            at: Local::now(),
        });
    }

    pub fn latest(&self) -> Option<Notice> {
        self.inner
            .lock()
            .expect("notice feed poisoned")
            .back()
            .cloned()
    }

    pub fn recent(&self) -> Vec<Notice> {
        self.inner
            .lock()
            .expect("notice feed poisoned")
            .iter()
            .cloned()
            .collect()
    }
}

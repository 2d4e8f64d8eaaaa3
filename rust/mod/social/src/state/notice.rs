//! Transient notifications, stored at `notice/list`.

use chrono::{DateTime, Utc};
use flux_derive::state;
use serde::{Deserialize, Serialize};

/// What a caller asks to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { title: title.into(), message: message.into() }
    }
}

/// A notice as displayed, with its id and creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeEntry {
    pub id: u64,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Newest last.
#[state("notice/list")]
#[derive(Default, Serialize, Deserialize)]
pub struct NoticeList {
    pub items: Vec<NoticeEntry>,
}

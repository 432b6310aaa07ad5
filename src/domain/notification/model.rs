//! Notification record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationStatus {
    Sent,
    Failed,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "SENT",
            Self::Failed => "FAILED",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "SENT" => Self::Sent,
            _ => Self::Failed,
        }
    }
}

impl std::fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: i32,
    pub booking_id: i32,
    pub requester_id: i32,
    pub subject: String,
    pub body: String,
    pub status: NotificationStatus,
    /// 1-based attempt number within one delivery
    pub attempt: u32,
    /// Why the attempt failed; `None` when sent
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub booking_id: i32,
    pub requester_id: i32,
    pub subject: String,
    pub body: String,
    pub status: NotificationStatus,
    pub attempt: u32,
    pub error: Option<String>,
}

impl NewNotification {
    pub fn into_notification(self, id: i32, created_at: DateTime<Utc>) -> Notification {
        Notification {
            id,
            booking_id: self.booking_id,
            requester_id: self.requester_id,
            subject: self.subject,
            body: self.body,
            status: self.status,
            attempt: self.attempt,
            error: self.error,
            created_at,
        }
    }
}

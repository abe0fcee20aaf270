//! Notification domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Notification type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    GroupJoinRequest,
    GroupJoinApproved,
    GroupJoinRejected,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::GroupJoinRequest => "group_join_request",
            NotificationType::GroupJoinApproved => "group_join_approved",
            NotificationType::GroupJoinRejected => "group_join_rejected",
        }
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "group_join_request" => Ok(NotificationType::GroupJoinRequest),
            "group_join_approved" => Ok(NotificationType::GroupJoinApproved),
            "group_join_rejected" => Ok(NotificationType::GroupJoinRejected),
            _ => Err(format!("Invalid notification type: {}", s)),
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Notification {
    pub id: i64,
    pub receiver_id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A notification about to be written.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub receiver_id: Uuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub payload: Option<serde_json::Value>,
}

impl NewNotification {
    /// Tells a group owner that someone applied.
    pub fn join_request(
        owner_id: Uuid,
        group_id: Uuid,
        group_title: &str,
        member_id: Uuid,
        applicant_id: Uuid,
        applicant_name: &str,
    ) -> Self {
        Self {
            receiver_id: owner_id,
            notification_type: NotificationType::GroupJoinRequest,
            title: "New join request".to_string(),
            message: format!("{} wants to join {}.", applicant_name, group_title),
            payload: Some(serde_json::json!({
                "group_id": group_id,
                "group_member_id": member_id,
                "applicant_id": applicant_id,
            })),
        }
    }

    /// Tells an applicant they were approved.
    pub fn join_approved(applicant_id: Uuid, group_id: Uuid, group_title: &str) -> Self {
        Self {
            receiver_id: applicant_id,
            notification_type: NotificationType::GroupJoinApproved,
            title: "Join request approved".to_string(),
            message: format!("You are now a member of {}.", group_title),
            payload: Some(serde_json::json!({ "group_id": group_id })),
        }
    }

    /// Tells an applicant they were rejected.
    pub fn join_rejected(applicant_id: Uuid, group_id: Uuid, group_title: &str) -> Self {
        Self {
            receiver_id: applicant_id,
            notification_type: NotificationType::GroupJoinRejected,
            title: "Join request declined".to_string(),
            message: format!("Your request to join {} was declined.", group_title),
            payload: Some(serde_json::json!({ "group_id": group_id })),
        }
    }
}

/// Response for the unread badge.
#[derive(Debug, Clone, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

/// Response for mark-read operations.
#[derive(Debug, Clone, Serialize)]
pub struct MarkReadResponse {
    pub updated: u64,
}

/// Response for listing unread notifications.
#[derive(Debug, Clone, Serialize)]
pub struct ListNotificationsResponse {
    pub data: Vec<Notification>,
    pub count: usize,
}

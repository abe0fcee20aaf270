//! Notification entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::NotificationType;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for notification_type that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
pub enum NotificationTypeDb {
    GroupJoinRequest,
    GroupJoinApproved,
    GroupJoinRejected,
}

impl From<NotificationTypeDb> for NotificationType {
    fn from(db: NotificationTypeDb) -> Self {
        match db {
            NotificationTypeDb::GroupJoinRequest => NotificationType::GroupJoinRequest,
            NotificationTypeDb::GroupJoinApproved => NotificationType::GroupJoinApproved,
            NotificationTypeDb::GroupJoinRejected => NotificationType::GroupJoinRejected,
        }
    }
}

impl From<NotificationType> for NotificationTypeDb {
    fn from(t: NotificationType) -> Self {
        match t {
            NotificationType::GroupJoinRequest => NotificationTypeDb::GroupJoinRequest,
            NotificationType::GroupJoinApproved => NotificationTypeDb::GroupJoinApproved,
            NotificationType::GroupJoinRejected => NotificationTypeDb::GroupJoinRejected,
        }
    }
}

/// Database row mapping for the notifications table.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationEntity {
    pub id: i64,
    pub receiver_id: Uuid,
    pub notification_type: NotificationTypeDb,
    pub title: String,
    pub message: String,
    pub payload: Option<serde_json::Value>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationEntity> for domain::models::Notification {
    fn from(entity: NotificationEntity) -> Self {
        Self {
            id: entity.id,
            receiver_id: entity.receiver_id,
            notification_type: entity.notification_type.into(),
            title: entity.title,
            message: entity.message,
            payload: entity.payload,
            is_read: entity.is_read,
            read_at: entity.read_at,
            created_at: entity.created_at,
        }
    }
}

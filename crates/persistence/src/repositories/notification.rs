//! Notification repository for database operations.

use domain::models::NewNotification;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{NotificationEntity, NotificationTypeDb};
use crate::metrics::QueryTimer;

const NOTIFICATION_COLUMNS: &str =
    "id, receiver_id, notification_type, title, message, payload, is_read, read_at, created_at";

/// Inserts a notification on an open connection or transaction.
pub(crate) async fn insert_notification(
    conn: &mut PgConnection,
    notification: &NewNotification,
) -> Result<NotificationEntity, sqlx::Error> {
    sqlx::query_as::<_, NotificationEntity>(&format!(
        r#"
        INSERT INTO notifications (receiver_id, notification_type, title, message, payload)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {}
        "#,
        NOTIFICATION_COLUMNS
    ))
    .bind(notification.receiver_id)
    .bind(NotificationTypeDb::from(notification.notification_type))
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(&notification.payload)
    .fetch_one(conn)
    .await
}

/// Repository for notification-related database operations.
#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a standalone notification.
    pub async fn create(
        &self,
        notification: &NewNotification,
    ) -> Result<NotificationEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_notification");
        let mut conn = self.pool.acquire().await?;
        let result = insert_notification(&mut conn, notification).await;
        timer.record();
        result
    }

    /// Newest unread notifications of a receiver.
    pub async fn find_unread(
        &self,
        receiver_id: Uuid,
        limit: i64,
    ) -> Result<Vec<NotificationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_unread_notifications");
        let result = sqlx::query_as::<_, NotificationEntity>(&format!(
            r#"
            SELECT {}
            FROM notifications
            WHERE receiver_id = $1 AND is_read = false
            ORDER BY id DESC
            LIMIT $2
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(receiver_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn count_unread(&self, receiver_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_unread_notifications");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE receiver_id = $1 AND is_read = false",
        )
        .bind(receiver_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Marks one notification read. Returns the number of rows changed.
    ///
    /// Rows owned by someone else or already read are left alone.
    pub async fn mark_read(&self, receiver_id: Uuid, id: i64) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("mark_notification_read");
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = true, read_at = NOW()
            WHERE id = $1 AND receiver_id = $2 AND is_read = false
            "#,
        )
        .bind(id)
        .bind(receiver_id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    pub async fn mark_all_read(&self, receiver_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("mark_all_notifications_read");
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = true, read_at = NOW()
            WHERE receiver_id = $1 AND is_read = false
            "#,
        )
        .bind(receiver_id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }
}

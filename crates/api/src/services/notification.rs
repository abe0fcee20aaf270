//! Notification persistence and realtime delivery.
//!
//! Every notification is written to the database first. Once the row is
//! committed the dispatcher pushes it through the [`NotificationPublisher`]
//! seam; push failures are logged and never surface to the caller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use domain::models::{NewNotification, Notification};
use domain::services::{NotificationPublisher, PushResult};
use persistence::repositories::NotificationRepository;
use sqlx::PgPool;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};
use uuid::Uuid;

struct Subscriber {
    id: u64,
    tx: mpsc::Sender<String>,
}

/// A live subscription to one user's notification channel.
pub struct Subscription {
    pub id: u64,
    pub user_id: Uuid,
    pub rx: mpsc::Receiver<String>,
}

/// In-process hub of per-user notification channels.
///
/// A user may hold several subscriptions at once (one per open tab or
/// device); a push fans out to all of them.
pub struct RealtimeHub {
    subscribers: DashMap<Uuid, Vec<Subscriber>>,
    next_id: AtomicU64,
    buffer: usize,
}

impl RealtimeHub {
    pub fn new(buffer: usize) -> Self {
        Self {
            subscribers: DashMap::new(),
            next_id: AtomicU64::new(1),
            buffer: buffer.max(1),
        }
    }

    /// Opens a new channel for `user_id`.
    pub fn subscribe(&self, user_id: Uuid) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.buffer);

        self.subscribers
            .entry(user_id)
            .or_default()
            .push(Subscriber { id, tx });
        metrics::gauge!("buddy_notification_subscribers").increment(1.0);

        debug!(user_id = %user_id, subscription_id = id, "Notification subscriber attached");

        Subscription { id, user_id, rx }
    }

    /// Drops one subscription. Unknown ids are ignored.
    pub fn unsubscribe(&self, user_id: Uuid, subscription_id: u64) {
        let removed = match self.subscribers.get_mut(&user_id) {
            Some(mut subs) => {
                let before = subs.len();
                subs.retain(|s| s.id != subscription_id);
                before - subs.len()
            }
            None => 0,
        };

        if removed > 0 {
            metrics::gauge!("buddy_notification_subscribers").decrement(removed as f64);
            debug!(user_id = %user_id, subscription_id, "Notification subscriber detached");
        }

        self.subscribers.remove_if(&user_id, |_, subs| subs.is_empty());
    }

    /// Number of live subscriptions held by `user_id`.
    pub fn subscriber_count(&self, user_id: Uuid) -> usize {
        self.subscribers
            .get(&user_id)
            .map(|subs| subs.iter().filter(|s| !s.tx.is_closed()).count())
            .unwrap_or(0)
    }

    fn push_text(&self, user_id: Uuid, text: &str) -> PushResult {
        let (delivered, full, pruned) = {
            let Some(mut subs) = self.subscribers.get_mut(&user_id) else {
                return PushResult::NoSubscriber;
            };

            let before = subs.len();
            subs.retain(|s| !s.tx.is_closed());
            let pruned = before - subs.len();

            let mut delivered = 0;
            let mut full = 0;
            for sub in subs.iter() {
                match sub.tx.try_send(text.to_string()) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => full += 1,
                    Err(TrySendError::Closed(_)) => {}
                }
            }
            (delivered, full, pruned)
        };

        if pruned > 0 {
            metrics::gauge!("buddy_notification_subscribers").decrement(pruned as f64);
            self.subscribers.remove_if(&user_id, |_, subs| subs.is_empty());
        }

        if delivered > 0 {
            PushResult::Delivered(delivered)
        } else if full > 0 {
            PushResult::Failed(format!("{} subscriber buffer(s) full", full))
        } else {
            PushResult::NoSubscriber
        }
    }
}

#[async_trait]
impl NotificationPublisher for RealtimeHub {
    async fn publish(&self, receiver_id: Uuid, notification: &Notification) -> PushResult {
        match serde_json::to_string(notification) {
            Ok(text) => self.push_text(receiver_id, &text),
            Err(e) => PushResult::Failed(e.to_string()),
        }
    }
}

/// Stores notifications and pushes them to their receivers.
#[derive(Clone)]
pub struct NotificationDispatcher {
    repo: NotificationRepository,
    publisher: Arc<dyn NotificationPublisher>,
    unread_limit: i64,
}

impl NotificationDispatcher {
    pub fn new(pool: PgPool, publisher: Arc<dyn NotificationPublisher>, unread_limit: i64) -> Self {
        Self {
            repo: NotificationRepository::new(pool),
            publisher,
            unread_limit,
        }
    }

    /// Persists a notification and pushes it.
    pub async fn send(&self, new: NewNotification) -> Result<Notification, sqlx::Error> {
        let notification: Notification = self.repo.create(&new).await?.into();
        self.push(&notification).await;
        Ok(notification)
    }

    /// Pushes an already committed notification. Never fails.
    pub async fn push(&self, notification: &Notification) {
        let result = self
            .publisher
            .publish(notification.receiver_id, notification)
            .await;

        match result {
            PushResult::Delivered(count) => {
                metrics::counter!("buddy_notifications_pushed_total", "result" => "delivered")
                    .increment(1);
                debug!(
                    notification_id = notification.id,
                    receiver_id = %notification.receiver_id,
                    subscriptions = count,
                    "Notification pushed"
                );
            }
            PushResult::NoSubscriber => {
                metrics::counter!("buddy_notifications_pushed_total", "result" => "offline")
                    .increment(1);
                debug!(
                    notification_id = notification.id,
                    receiver_id = %notification.receiver_id,
                    "Receiver offline; notification kept for later fetch"
                );
            }
            PushResult::Failed(reason) => {
                metrics::counter!("buddy_notifications_pushed_total", "result" => "failed")
                    .increment(1);
                warn!(
                    notification_id = notification.id,
                    receiver_id = %notification.receiver_id,
                    error = %reason,
                    "Failed to push notification"
                );
            }
        }
    }

    /// Unread notifications for `receiver_id`, newest first.
    pub async fn fetch_unread(&self, receiver_id: Uuid) -> Result<Vec<Notification>, sqlx::Error> {
        let rows = self.repo.find_unread(receiver_id, self.unread_limit).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn unread_count(&self, receiver_id: Uuid) -> Result<i64, sqlx::Error> {
        self.repo.count_unread(receiver_id).await
    }

    /// Marks one notification read. Returns the number of rows changed, which
    /// is zero for foreign, unknown or already read notifications.
    pub async fn mark_read(&self, receiver_id: Uuid, id: i64) -> Result<u64, sqlx::Error> {
        let updated = self.repo.mark_read(receiver_id, id).await?;
        debug!(receiver_id = %receiver_id, notification_id = id, updated, "Marked notification read");
        Ok(updated)
    }

    pub async fn mark_all_read(&self, receiver_id: Uuid) -> Result<u64, sqlx::Error> {
        let updated = self.repo.mark_all_read(receiver_id).await?;
        info!(receiver_id = %receiver_id, updated, "Marked all notifications read");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::models::NotificationType;

    fn notification(id: i64, receiver_id: Uuid) -> Notification {
        Notification {
            id,
            receiver_id,
            notification_type: NotificationType::GroupJoinRequest,
            title: "New join request".to_string(),
            message: "Kim wants to join Hiking.".to_string(),
            payload: None,
            is_read: false,
            read_at: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscriber() {
        let hub = RealtimeHub::new(4);
        let user = Uuid::new_v4();

        let result = hub.publish(user, &notification(1, user)).await;
        assert_eq!(result, PushResult::NoSubscriber);
    }

    #[tokio::test]
    async fn test_publish_fans_out_to_every_subscription() {
        let hub = RealtimeHub::new(4);
        let user = Uuid::new_v4();
        let mut first = hub.subscribe(user);
        let mut second = hub.subscribe(user);

        let result = hub.publish(user, &notification(7, user)).await;
        assert_eq!(result, PushResult::Delivered(2));

        for sub in [&mut first, &mut second] {
            let text = sub.rx.recv().await.unwrap();
            let value: serde_json::Value = serde_json::from_str(&text).unwrap();
            assert_eq!(value["id"], 7);
            assert_eq!(value["type"], "group_join_request");
        }
    }

    #[tokio::test]
    async fn test_publish_only_reaches_receiver() {
        let hub = RealtimeHub::new(4);
        let receiver = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut other_sub = hub.subscribe(other);

        hub.publish(receiver, &notification(2, receiver)).await;

        assert!(other_sub.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_subscribers_are_pruned() {
        let hub = RealtimeHub::new(4);
        let user = Uuid::new_v4();
        let sub = hub.subscribe(user);
        drop(sub);

        let result = hub.publish(user, &notification(3, user)).await;

        assert_eq!(result, PushResult::NoSubscriber);
        assert_eq!(hub.subscriber_count(user), 0);
    }

    #[tokio::test]
    async fn test_full_buffer_reports_failure() {
        let hub = RealtimeHub::new(1);
        let user = Uuid::new_v4();
        let _sub = hub.subscribe(user);

        assert_eq!(
            hub.publish(user, &notification(1, user)).await,
            PushResult::Delivered(1)
        );
        assert!(matches!(
            hub.publish(user, &notification(2, user)).await,
            PushResult::Failed(_)
        ));
    }

    #[test]
    fn test_unsubscribe() {
        let hub = RealtimeHub::new(4);
        let user = Uuid::new_v4();
        let first = hub.subscribe(user);
        let _second = hub.subscribe(user);
        assert_eq!(hub.subscriber_count(user), 2);

        hub.unsubscribe(user, first.id);
        assert_eq!(hub.subscriber_count(user), 1);

        hub.unsubscribe(user, 9999);
        assert_eq!(hub.subscriber_count(user), 1);
    }
}

//! Realtime notification publishing.
//!
//! Provides the abstraction the dispatcher pushes through after a
//! notification row is committed.

use std::sync::Mutex;

use uuid::Uuid;

use crate::models::Notification;

/// Result of a push attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushResult {
    /// Notification reached this many live subscriptions.
    Delivered(usize),
    /// Receiver has no live subscription.
    NoSubscriber,
    /// Push failed (but was non-blocking).
    Failed(String),
}

/// Publisher trait for per-user realtime channels.
#[async_trait::async_trait]
pub trait NotificationPublisher: Send + Sync {
    /// Push a committed notification to the receiver's live channel.
    async fn publish(&self, receiver_id: Uuid, notification: &Notification) -> PushResult;
}

/// Mock publisher for development and testing.
///
/// Records pushes instead of delivering them.
#[derive(Debug, Default)]
pub struct MockNotificationPublisher {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
    published: Mutex<Vec<(Uuid, i64)>>,
}

impl MockNotificationPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock publisher that simulates failures.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// (receiver, notification id) pairs pushed so far.
    pub fn published(&self) -> Vec<(Uuid, i64)> {
        self.published
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl NotificationPublisher for MockNotificationPublisher {
    async fn publish(&self, receiver_id: Uuid, notification: &Notification) -> PushResult {
        if self.simulate_failure {
            tracing::warn!(
                receiver_id = %receiver_id,
                notification_id = notification.id,
                "Mock publisher simulating failure"
            );
            return PushResult::Failed("Simulated failure".to_string());
        }

        tracing::info!(
            receiver_id = %receiver_id,
            notification_id = notification.id,
            notification_type = %notification.notification_type,
            "Mock: Would push notification"
        );

        if let Ok(mut published) = self.published.lock() {
            published.push((receiver_id, notification.id));
        }

        PushResult::Delivered(1)
    }
}

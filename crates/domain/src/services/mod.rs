//! Domain services for the Buddy backend.
//!
//! Services contain business logic that operates on domain models.

pub mod membership;
pub mod notification;

pub use membership::{ApprovalPlan, MembershipError, RejectionPlan};
pub use notification::{MockNotificationPublisher, NotificationPublisher, PushResult};

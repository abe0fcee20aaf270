//! Domain layer for the Buddy backend.
//!
//! This crate contains:
//! - Domain models (User, Group, GroupMember, ChatRoom, Notification)
//! - Membership rules and the realtime publisher seam
//! - Domain error types

pub mod models;
pub mod services;

//! HTTP route handlers.

pub mod board;
pub mod chat;
pub mod groups;
pub mod health;
pub mod members;
pub mod notifications;
pub mod regions;
pub mod signaling;
pub mod users;

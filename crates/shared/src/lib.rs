//! Shared utilities and common types for the Buddy backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Access-token validation for the identity boundary
//! - Common validation logic

pub mod jwt;
pub mod validation;

//! Middleware module
//!
//! This module contains checks applied to updates before they reach the
//! dispatcher

pub mod auth;

// Re-export commonly used middleware
pub use auth::AccessGuard;

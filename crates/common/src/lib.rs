//! Inkwell Common Library
//!
//! Shared code for the Inkwell multi-tenant blogging platform:
//! - Database models and repository patterns
//! - Error types and handling
//! - Configuration management
//! - Authentication utilities
//! - Mail delivery seam
//! - Metrics and observability
//! - Slug derivation

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod mail;
pub mod metrics;
pub mod slug;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::Repository;
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reserved host label that never resolves to a tenant
pub const RESERVED_WWW_LABEL: &str = "www";

/// Cap on sidebar discovery rows, posts and blogs alike
pub const SIDEBAR_LIMIT: u64 = 10;

/// Trailing window for the recent cross-tenant post sidebar, in days
pub const SIDEBAR_WINDOW_DAYS: i64 = 30;

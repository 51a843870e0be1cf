//! Shared types, errors, and configuration for Inkwell.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Authentication errors raised at the identity boundary
//! - Configuration management
//! - Bearer token claims and validation (the identity boundary)

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::{CallerRole, Claims};
pub use config::AppConfig;
pub use error::AppError;
pub use jwt::{JwtError, JwtService};

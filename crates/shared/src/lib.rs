//! Shared configuration and auth types for Caja.
//!
//! This crate provides common types used across all other crates:
//! - Application configuration management
//! - JWT claims and token validation

pub mod auth;
pub mod config;
pub mod jwt;

pub use auth::Claims;
pub use config::AppConfig;
pub use jwt::{JwtConfig, JwtError, JwtService};

//! Shared types, errors, and configuration for Merx.
//!
//! This crate provides common types used across all other crates:
//! - Currency and monetary rounding primitives
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Engine configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::EngineConfig;
pub use error::{AppError, AppResult};

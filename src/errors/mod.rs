//! Centralized error handling for the dashboard
//!
//! # Error Categories
//!
//! - **Source Errors**: covid and news provider failures, including the
//!   distinguished missing/unauthorized credential case
//! - **Application Errors**: page rendering failures surfaced to HTTP

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;

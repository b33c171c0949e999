//! Relay HTTP API module.
//!
//! # Purpose
//! Exposes the route handler modules and the shared 404 fallback.
pub mod error;
pub mod openapi;
pub mod publish;
pub mod subscribe;
pub mod system;
pub mod types;

use crate::api::error::{ApiError, api_not_found};

/// Fallback for any unmatched route.
pub(crate) async fn not_found() -> ApiError {
    api_not_found("Not Found!")
}

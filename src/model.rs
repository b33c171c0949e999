//! Domain model for the relay.
//!
//! # Purpose
//! Defines the subscription entity persisted by the store backends. This is
//! the only persisted entity in the system; publish payloads are ephemeral.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A registered delivery target: one (topic, url) pair plus metadata.
///
/// Records are created by the subscribe operation and queried during publish
/// to resolve the current subscriber set. They are never updated or deleted;
/// there is no unsubscribe operation.
///
/// # Invariants
/// - `topic` is non-blank and `url` is a valid http/https URL (validated
///   before any store call).
/// - No two records share the same `(topic, url)` pair. Both backends enforce
///   this at the store layer in addition to the service-level check.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Subscription {
    /// Store-assigned identifier. Opaque to callers; never serialized into
    /// API responses.
    pub id: i64,
    pub topic: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

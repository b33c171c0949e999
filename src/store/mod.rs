//! Subscription store abstraction.
//!
//! # Purpose
//! Defines the persistence boundary consumed by the subscription service and
//! the publish dispatcher, plus the error type shared by all backends. The
//! store handle is established once at startup and shared read-only across
//! request handlers; handlers only issue independent queries and inserts.
use crate::model::Subscription;
use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod postgres;
#[cfg(all(test, feature = "pg-tests"))]
mod postgres_tests;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with the same (topic, url) already exists. Backends raise
    /// this from their own uniqueness enforcement; the service treats it as
    /// the benign "already exists" outcome, not a failure.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Return all subscriptions for `topic`, additionally filtered to an
    /// exact `url` match when one is supplied. `None` means "any url for
    /// this topic" and is how publish resolves the subscriber set.
    async fn find(&self, topic: &str, url: Option<&str>) -> StoreResult<Vec<Subscription>>;

    /// Create a subscription with a store-assigned id and creation
    /// timestamps. Returns [`StoreError::Conflict`] when the (topic, url)
    /// pair is already registered.
    async fn insert(&self, topic: &str, url: &str) -> StoreResult<Subscription>;

    async fn health_check(&self) -> StoreResult<()>;
    fn is_durable(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}

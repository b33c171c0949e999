//! In-memory implementation of the subscription store.
//!
//! # Purpose
//! Implements [`SubscriptionStore`] with a `HashMap` guarded by
//! `tokio::sync::RwLock`. It exists for:
//! - local development and tests (no external dependencies)
//! - deployments where durability is not required
//!
//! # Durability and consistency
//! - **Not durable**: all subscriptions are lost on process restart.
//! - **Single-process consistency**: the duplicate check and the insert run
//!   under one write lock, so the (topic, url) uniqueness invariant holds
//!   even for concurrent subscribes within this process.
//! - **No multi-node coordination**: multiple relay instances each have
//!   independent state; use the Postgres backend when more than one instance
//!   shares a registry.
use super::{StoreError, StoreResult, SubscriptionStore};
use crate::model::Subscription;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory subscription registry keyed by `(topic, url)`.
///
/// The map is wrapped in `Arc<RwLock<...>>` so the store can be cloned and
/// shared across async request handlers: reads (publish fan-out lookups)
/// proceed concurrently, writes (new subscriptions) are serialized.
#[derive(Default)]
pub struct InMemoryStore {
    subscriptions: Arc<RwLock<HashMap<(String, String), Subscription>>>,
    next_id: Arc<RwLock<i64>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionStore for InMemoryStore {
    async fn find(&self, topic: &str, url: Option<&str>) -> StoreResult<Vec<Subscription>> {
        let subscriptions = self.subscriptions.read().await;
        let mut items: Vec<Subscription> = subscriptions
            .values()
            .filter(|sub| sub.topic == topic)
            .filter(|sub| url.is_none_or(|u| sub.url == u))
            .cloned()
            .collect();
        // Deterministic order keeps fan-out logs and tests predictable.
        items.sort_by_key(|sub| sub.id);
        Ok(items)
    }

    async fn insert(&self, topic: &str, url: &str) -> StoreResult<Subscription> {
        // Check and insert under one write lock so two racing subscribes
        // cannot both pass the duplicate check.
        let mut subscriptions = self.subscriptions.write().await;
        let key = (topic.to_string(), url.to_string());
        if subscriptions.contains_key(&key) {
            return Err(StoreError::Conflict(format!(
                "subscription exists for topic [{topic}]"
            )));
        }
        let mut next_id = self.next_id.write().await;
        *next_id += 1;
        let now = Utc::now();
        let subscription = Subscription {
            id: *next_id,
            topic: topic.to_string(),
            url: url.to_string(),
            created_at: now,
            updated_at: now,
        };
        subscriptions.insert(key, subscription.clone());
        metrics::counter!("relay_subscriptions_created_total").increment(1);
        Ok(subscription)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_assigns_ids_and_timestamps() {
        let store = InMemoryStore::new();
        let first = store.insert("t1", "http://localhost:1234/a").await.unwrap();
        let second = store.insert("t1", "http://localhost:1234/b").await.unwrap();
        assert_eq!(first.topic, "t1");
        assert_eq!(first.url, "http://localhost:1234/a");
        assert_eq!(first.created_at, first.updated_at);
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_pair() {
        let store = InMemoryStore::new();
        store.insert("t1", "http://localhost:1234/a").await.unwrap();
        let err = store
            .insert("t1", "http://localhost:1234/a")
            .await
            .expect_err("duplicate must conflict");
        assert!(matches!(err, StoreError::Conflict(_)));
        // Same url under a different topic is a distinct subscription.
        store.insert("t2", "http://localhost:1234/a").await.unwrap();
    }

    #[tokio::test]
    async fn find_filters_by_topic_and_optional_url() {
        let store = InMemoryStore::new();
        store.insert("t1", "http://localhost:1234/a").await.unwrap();
        store.insert("t1", "http://localhost:1234/b").await.unwrap();
        store.insert("t2", "http://localhost:1234/a").await.unwrap();

        let by_topic = store.find("t1", None).await.unwrap();
        assert_eq!(by_topic.len(), 2);

        let exact = store
            .find("t1", Some("http://localhost:1234/b"))
            .await
            .unwrap();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].url, "http://localhost:1234/b");

        let missing = store.find("t3", None).await.unwrap();
        assert!(missing.is_empty());
    }
}

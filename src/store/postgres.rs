//! Postgres-backed implementation of the subscription store.
//!
//! # What this module is
//! Implements [`SubscriptionStore`] using Postgres (via `sqlx`) as a durable,
//! shared registry so multiple relay instances can serve the same topics.
//!
//! # Key invariants
//! - `(topic, url)` uniqueness is enforced by a unique index; a violation is
//!   surfaced as [`StoreError::Conflict`]. The service-level
//!   check-then-insert alone would leave a race window between two
//!   concurrent subscribes, so the index is what actually closes it.
//! - Migrations run at startup, before any request is served, so handlers
//!   can assume the schema exists.
//!
//! # Concurrency model
//! - The store is shared across async handlers; `sqlx::PgPool` manages
//!   connection concurrency. Pool sizing and acquire timeouts are explicit
//!   because hanging forever on DB failures is unacceptable for a service
//!   sitting in the publish path.
//!
//! # Operational notes
//! - Database URLs may contain credentials; they are never logged.
use super::{StoreError, StoreResult, SubscriptionStore};
use crate::config::PostgresConfig;
use crate::model::Subscription;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use std::time::Duration;

/// Durable subscription registry backed by Postgres.
pub struct PostgresStore {
    pool: PgPool,
}

/// Row shape for the `subscriptions` table.
///
/// Kept separate from the domain [`Subscription`] so schema details stay
/// localized to this module.
#[derive(Debug, Clone, FromRow)]
struct DbSubscription {
    id: i64,
    topic: String,
    url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DbSubscription> for Subscription {
    fn from(row: DbSubscription) -> Self {
        Subscription {
            id: row.id,
            topic: row.topic,
            url: row.url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PostgresStore {
    /// Connect, run migrations, and return a ready store.
    ///
    /// Fails startup rather than serving requests against a missing or
    /// incompatible schema.
    pub async fn connect(pg: &PostgresConfig) -> StoreResult<Self> {
        let connect_options =
            PgConnectOptions::from_str(&pg.url).map_err(|err| StoreError::Unexpected(err.into()))?;
        let pool = PgPoolOptions::new()
            .max_connections(pg.max_connections)
            .acquire_timeout(Duration::from_millis(pg.acquire_timeout_ms))
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|err| StoreError::Unexpected(err.into()))?;
        Ok(Self { pool })
    }

    /// Build a store over an existing pool. Used by tests that manage their
    /// own schema lifecycle.
    #[cfg(any(test, feature = "pg-tests"))]
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for PostgresStore {
    async fn find(&self, topic: &str, url: Option<&str>) -> StoreResult<Vec<Subscription>> {
        // Two static queries instead of dynamic SQL; the optional url filter
        // is the only variation.
        let rows = match url {
            Some(url) => {
                sqlx::query_as::<_, DbSubscription>(
                    r#"SELECT id, topic, url, created_at, updated_at
                       FROM subscriptions WHERE topic = $1 AND url = $2
                       ORDER BY id"#,
                )
                .bind(topic)
                .bind(url)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, DbSubscription>(
                    r#"SELECT id, topic, url, created_at, updated_at
                       FROM subscriptions WHERE topic = $1
                       ORDER BY id"#,
                )
                .bind(topic)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows.into_iter().map(Subscription::from).collect())
    }

    async fn insert(&self, topic: &str, url: &str) -> StoreResult<Subscription> {
        let row = sqlx::query_as::<_, DbSubscription>(
            r#"INSERT INTO subscriptions (topic, url)
               VALUES ($1, $2)
               RETURNING id, topic, url, created_at, updated_at"#,
        )
        .bind(topic)
        .bind(url)
        .fetch_one(&self.pool)
        .await?;
        metrics::counter!("relay_subscriptions_created_total").increment(1);
        Ok(row.into())
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn is_durable(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            return StoreError::Conflict("subscription exists".to_string());
        }
        StoreError::Unexpected(err.into())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().map(|code| code == "23505").unwrap_or(false);
    }
    false
}

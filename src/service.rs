//! Subscription service: the check-then-insert dedup logic.
//!
//! # Purpose
//! Enforces the no-duplicate-(topic, url) invariant by composing a store
//! lookup with a conditional insert. Duplicate subscription is a benign
//! business outcome, kept distinct from validation and store failures.
use crate::model::Subscription;
use crate::store::{StoreError, SubscriptionStore};
use thiserror::Error;

/// Result of a subscribe call that reached the store.
#[derive(Debug)]
pub enum SubscribeOutcome {
    Created(Subscription),
    AlreadyExists,
}

/// Store failure tagged with the phase it occurred in, so callers can
/// report "could not verify" and "could not create" separately.
#[derive(Debug, Error)]
pub enum SubscribeError {
    #[error("could not verify subscription")]
    Verify(#[source] StoreError),
    #[error("subscription could not be created")]
    Create(#[source] StoreError),
}

/// Register `url` as a delivery target for `topic`.
///
/// Callers validate topic and url first; this function only runs the
/// store-side part of the operation:
/// 1. look up an exact (topic, url) match; any hit is `AlreadyExists`
/// 2. otherwise insert a new record
///
/// The lookup and insert are not atomic against the store, so two
/// concurrent subscribes for the same pair can both pass step 1. Backends
/// enforce uniqueness themselves and report the losing insert as a
/// [`StoreError::Conflict`], which is folded into `AlreadyExists` here
/// rather than surfaced as a failure.
///
/// # Errors
/// Propagates store lookup/insert failures other than the conflict case,
/// tagged with the phase they occurred in.
pub async fn subscribe(
    store: &dyn SubscriptionStore,
    topic: &str,
    url: &str,
) -> Result<SubscribeOutcome, SubscribeError> {
    let existing = store
        .find(topic, Some(url))
        .await
        .map_err(SubscribeError::Verify)?;
    if !existing.is_empty() {
        tracing::debug!(topic, url, "subscription already exists");
        return Ok(SubscribeOutcome::AlreadyExists);
    }

    match store.insert(topic, url).await {
        Ok(subscription) => {
            tracing::info!(topic, url, id = subscription.id, "subscription created");
            Ok(SubscribeOutcome::Created(subscription))
        }
        Err(StoreError::Conflict(_)) => Ok(SubscribeOutcome::AlreadyExists),
        Err(err) => Err(SubscribeError::Create(err)),
    }
}

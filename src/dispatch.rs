//! Publish fan-out dispatcher.
//!
//! # Purpose
//! Delivers one publish payload to every subscriber of a topic as an
//! asynchronous, best-effort broadcast. The publish HTTP response is
//! computed from the subscriber count before any delivery starts; delivery
//! outcomes are logged and counted but never surfaced to the publisher and
//! never abort sibling deliveries.
//!
//! # Concurrency model
//! Each delivery runs as its own spawned task gated by a shared semaphore,
//! so a publish to a large topic cannot open an unbounded number of outbound
//! connections. The reqwest client applies a per-call timeout; a timed-out
//! delivery is treated like any other failed delivery.
use crate::model::Subscription;
use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Outbound payload sent to each subscriber: the original publish body
/// wrapped with its topic.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct OutboundPayload {
    pub topic: String,
    #[schema(value_type = Object)]
    pub data: Value,
}

/// Fan-out engine shared across request handlers.
///
/// Cloning is cheap: the reqwest client and the permit pool are handles.
#[derive(Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
    permits: Arc<Semaphore>,
}

impl Dispatcher {
    /// Build a dispatcher with a per-delivery timeout and a cap on
    /// concurrently in-flight deliveries.
    pub fn new(delivery_timeout: Duration, max_inflight: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(delivery_timeout)
            .build()?;
        Ok(Self {
            client,
            permits: Arc::new(Semaphore::new(max_inflight)),
        })
    }

    /// Start delivering `payload` to every subscription and return
    /// immediately.
    ///
    /// There is no guarantee any delivery has completed, or even started,
    /// when this returns; the caller's response must not depend on them.
    pub fn dispatch(&self, payload: OutboundPayload, subscriptions: Vec<Subscription>) {
        metrics::counter!("relay_publishes_total").increment(1);
        let payload = Arc::new(payload);
        for subscription in subscriptions {
            let client = self.client.clone();
            let permits = self.permits.clone();
            let payload = payload.clone();
            tokio::spawn(async move {
                // The semaphore is never closed, so acquisition only fails
                // at shutdown; dropping the delivery then is fine.
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                deliver(&client, &subscription, &payload).await;
            });
        }
    }
}

/// POST the payload to a single subscriber and record the outcome.
async fn deliver(client: &reqwest::Client, subscription: &Subscription, payload: &OutboundPayload) {
    let topic = subscription.topic.as_str();
    let url = subscription.url.as_str();
    tracing::debug!(topic, url, "delivering publish payload");
    match client.post(url).json(payload).send().await {
        Ok(response) if response.status().is_success() => {
            metrics::counter!("relay_deliveries_total", "outcome" => "ok").increment(1);
            tracing::debug!(topic, url, status = %response.status(), "delivery succeeded");
        }
        Ok(response) => {
            metrics::counter!("relay_deliveries_total", "outcome" => "rejected").increment(1);
            tracing::warn!(topic, url, status = %response.status(), "subscriber rejected delivery");
        }
        Err(err) => {
            // Covers connection failures and the per-call timeout alike.
            metrics::counter!("relay_deliveries_total", "outcome" => "error").increment(1);
            tracing::warn!(topic, url, error = %err, "delivery failed");
        }
    }
}

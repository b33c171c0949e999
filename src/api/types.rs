//! HTTP API request/response types.
//!
//! # Purpose
//! Defines the payload shapes for the relay's REST API and OpenAPI schema
//! generation. Error bodies are always `{"error": <message>}`.
use crate::dispatch::OutboundPayload;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Subscribe request body. Parsed manually from JSON so an empty or
/// malformed body can be distinguished from a missing `url` field.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SubscribeRequest {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SubscriptionResponse {
    pub topic: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublishResponse {
    /// Human-readable completion line including the subscriber count found
    /// before dispatch started.
    pub status: String,
    pub data: OutboundPayload,
}

/// Response of the sample subscriber echo endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EchoResponse {
    pub tag: String,
    #[schema(value_type = Object)]
    pub data: Value,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    pub status: String,
}

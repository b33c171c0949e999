//! OpenAPI schema aggregation for the relay API.
//!
//! # Purpose
//! Collects all routes and schema types into a single OpenAPI document for
//! docs and client generation.
use crate::api::{
    publish, subscribe, system,
    types::{ErrorResponse, HealthStatus, PublishResponse, SubscribeRequest, SubscriptionResponse},
};
use crate::dispatch::OutboundPayload;
use crate::model::Subscription;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "relay",
        version = "v1",
        description = "Topic-based publish/subscribe relay HTTP API"
    ),
    paths(
        subscribe::subscribe,
        publish::publish,
        system::health,
        system::subscriber_echo,
    ),
    components(schemas(
        ErrorResponse,
        HealthStatus,
        OutboundPayload,
        PublishResponse,
        SubscribeRequest,
        Subscription,
        SubscriptionResponse,
        crate::api::types::EchoResponse,
    ))
)]
pub struct ApiDoc;

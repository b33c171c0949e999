//! Publish API handler.
//!
//! # Purpose
//! Resolves the current subscriber set for a topic and hands the payload to
//! the fan-out dispatcher. The response reports the subscriber count found
//! before dispatch and never waits on, or reflects, delivery outcomes.
use crate::api::error::{ApiError, api_internal, api_validation_error};
use crate::api::types::PublishResponse;
use crate::app::AppState;
use crate::dispatch::OutboundPayload;
use crate::validate;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde_json::Value;

#[utoipa::path(
    post,
    path = "/publish/{topic}",
    tag = "publishing",
    params(
        ("topic" = String, Path, description = "Topic to publish to")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Payload dispatched to all current subscribers", body = PublishResponse),
        (status = 400, description = "Blank topic or non-object body", body = crate::api::types::ErrorResponse),
        (status = 500, description = "Subscriber lookup failed", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn publish(
    Path(topic): Path<String>,
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PublishResponse>, ApiError> {
    if !validate::topic_is_valid(&topic) {
        return Err(api_validation_error(
            "Path parameter 'topic' undefined or blank",
        ));
    }

    // Only a JSON object is a valid publish body; arrays, primitives, null,
    // and unparsable bodies are all rejected the same way.
    let body = match body {
        Ok(Json(value)) if value.is_object() => value,
        Ok(Json(value)) => {
            tracing::debug!(body = %value, "publish body is not an object");
            return Err(api_validation_error("Invalid request body."));
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection, "publish body rejected");
            return Err(api_validation_error("Invalid request body."));
        }
    };

    let subscriptions = state
        .store
        .find(&topic, None)
        .await
        .map_err(|err| api_internal("Failed to fetch subscribers", &err))?;
    let count = subscriptions.len();

    let payload = OutboundPayload { topic, data: body };
    // Fire-and-forget: the response below is complete before any delivery
    // has necessarily started.
    state.dispatcher.dispatch(payload.clone(), subscriptions);

    Ok(Json(PublishResponse {
        status: format!("Publish to {count} subscriber(s) completed!"),
        data: payload,
    }))
}

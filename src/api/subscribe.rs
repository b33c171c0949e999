//! Subscribe API handler.
//!
//! # Purpose
//! Validates the topic path parameter and the callback URL, then runs the
//! dedup-checked registration. A duplicate (topic, url) pair is a 200 with
//! an `error` field, kept distinct from real failures.
use crate::api::error::{ApiError, api_internal, api_validation_error};
use crate::api::types::{ErrorResponse, SubscriptionResponse};
use crate::app::AppState;
use crate::service::{self, SubscribeError, SubscribeOutcome};
use crate::validate;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

#[utoipa::path(
    post,
    path = "/subscribe/{topic}",
    tag = "subscriptions",
    params(
        ("topic" = String, Path, description = "Topic to subscribe to")
    ),
    request_body = crate::api::types::SubscribeRequest,
    responses(
        (status = 200, description = "Subscription created, or already exists", body = SubscriptionResponse),
        (status = 400, description = "Blank topic, empty body, or invalid URL", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub(crate) async fn subscribe(
    Path(topic): Path<String>,
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    if !validate::topic_is_valid(&topic) {
        return Err(api_validation_error(
            "Path parameter 'topic' undefined or blank",
        ));
    }

    // The body is parsed as raw JSON so an absent/empty body and a missing
    // url field produce their own messages.
    let body = match body {
        Ok(Json(value)) => value,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "subscribe body rejected");
            return Err(api_validation_error(
                "Request body cannot be blank nor empty.",
            ));
        }
    };
    let fields = match body.as_object() {
        Some(map) if !map.is_empty() => map,
        _ => {
            return Err(api_validation_error(
                "Request body cannot be blank nor empty.",
            ));
        }
    };

    let url = match fields.get("url") {
        None | Some(Value::Null) => return Err(api_validation_error("URL cannot be blank.")),
        Some(Value::String(url)) if url.trim().is_empty() => {
            return Err(api_validation_error("URL cannot be blank."));
        }
        Some(Value::String(url)) => url.as_str(),
        // A non-string url can never parse; same outcome as a bad string.
        Some(_) => return Err(api_validation_error("Invalid URL provided.")),
    };
    if !validate::is_valid_http_url(url) {
        return Err(api_validation_error("Invalid URL provided."));
    }

    match service::subscribe(state.store.as_ref(), &topic, url).await {
        Ok(SubscribeOutcome::Created(subscription)) => Ok(Json(SubscriptionResponse {
            topic: subscription.topic,
            url: subscription.url,
        })
        .into_response()),
        Ok(SubscribeOutcome::AlreadyExists) => Ok(Json(ErrorResponse {
            error: "Subscription already exists!".to_string(),
        })
        .into_response()),
        Err(SubscribeError::Verify(err)) => Err(api_internal("Could not verify subscription", &err)),
        Err(SubscribeError::Create(err)) => {
            Err(api_internal("Subscription could not be created", &err))
        }
    }
}

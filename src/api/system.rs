//! Health and sample-subscriber handlers.
use crate::api::error::{ApiError, api_internal};
use crate::api::types::{EchoResponse, HealthStatus};
use crate::app::AppState;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde_json::Value;

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "system",
    responses(
        (status = 200, description = "Relay health", body = HealthStatus),
        (status = 500, description = "Store unavailable", body = crate::api::types::ErrorResponse)
    )
)]
/// Probe the backing store and return `ok` when it is reachable.
pub(crate) async fn health(State(state): State<AppState>) -> Result<Json<HealthStatus>, ApiError> {
    if let Err(err) = state.store.health_check().await {
        return Err(api_internal("storage unavailable", &err));
    }
    Ok(Json(HealthStatus {
        status: "ok".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/subscribers/{tag}",
    tag = "system",
    params(
        ("tag" = String, Path, description = "Arbitrary label echoed back")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Echoed delivery payload", body = EchoResponse)
    )
)]
/// Echo endpoint usable as a template subscriber URL when trying the relay
/// out locally: it returns whatever payload was delivered to it.
pub(crate) async fn subscriber_echo(
    Path(tag): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Json<EchoResponse> {
    let data = match body {
        Ok(Json(value)) => value,
        Err(_) => Value::Null,
    };
    Json(EchoResponse { tag, data })
}

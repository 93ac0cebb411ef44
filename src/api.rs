// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP surface for the batch change service.
//!
//! A thin axum layer over [`BatchChangeService`]: handlers extract the
//! already-authenticated principal from forwarded identity headers,
//! delegate, and translate [`BatchChangeError`] into status codes.
//! Authentication itself is an upstream concern; this layer trusts the
//! headers it is handed.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::batch::BatchChangeService;
use crate::constants::{METRICS_PATH, PING_RESPONSE};
use crate::errors::BatchChangeError;
use crate::metrics::metrics_text;
use crate::types::{AuthPrincipal, BatchChangeInput};

#[cfg(test)]
#[path = "api_tests.rs"]
mod api_tests;

/// Shared handler state.
pub struct ApiState {
    /// The batch change service
    pub service: BatchChangeService,
}

/// Build the service router.
#[must_use]
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route(
            "/zones/batchrecordchanges",
            post(create_batch_change).get(list_batch_changes),
        )
        .route("/zones/batchrecordchanges/{id}", get(get_batch_change))
        .route("/ping", get(ping))
        .route(METRICS_PATH, get(metrics))
        .with_state(state)
}

/// Identity headers injected by the upstream auth layer.
fn principal_from_headers(headers: &HeaderMap) -> Result<AuthPrincipal, Response> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };

    let Some(user_id) = header("x-user-id") else {
        let body = Json(json!({"errors": ["missing authenticated user"]}));
        return Err((StatusCode::UNAUTHORIZED, body).into_response());
    };

    let user_name = header("x-user-name").unwrap_or_else(|| user_id.clone());
    let group_ids = header("x-user-groups")
        .map(|groups| {
            groups
                .split(',')
                .map(str::trim)
                .filter(|group| !group.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let is_super = header("x-user-super").is_some_and(|value| value == "true");

    Ok(AuthPrincipal {
        user_id,
        user_name,
        group_ids,
        is_super,
    })
}

fn error_response(error: &BatchChangeError) -> Response {
    match error {
        BatchChangeError::InvalidBatchChangeResponses { responses } => {
            (StatusCode::BAD_REQUEST, Json(responses)).into_response()
        }
        BatchChangeError::BatchChangeIsEmpty | BatchChangeError::BatchChangeIsTooLarge { .. } => (
            StatusCode::BAD_REQUEST,
            Json(json!({"errors": [error.to_string()]})),
        )
            .into_response(),
        BatchChangeError::BatchChangeNotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(json!({"errors": [error.to_string()]})),
        )
            .into_response(),
        BatchChangeError::UserNotAuthorizedToView { .. } => (
            StatusCode::FORBIDDEN,
            Json(json!({"errors": [error.to_string()]})),
        )
            .into_response(),
        BatchChangeError::Repository(_) | BatchChangeError::Conversion(_) => {
            error!(%error, "Batch change request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"errors": ["internal error"]})),
            )
                .into_response()
        }
    }
}

async fn create_batch_change(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(input): Json<BatchChangeInput>,
) -> Response {
    let auth = match principal_from_headers(&headers) {
        Ok(auth) => auth,
        Err(response) => return response,
    };
    match state.service.apply_batch_change(&auth, input).await {
        Ok(batch) => (StatusCode::ACCEPTED, Json(batch)).into_response(),
        Err(error) => error_response(&error),
    }
}

async fn get_batch_change(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let auth = match principal_from_headers(&headers) {
        Ok(auth) => auth,
        Err(response) => return response,
    };
    match state.service.get_batch_change(&auth, &id).await {
        Ok(batch) => (StatusCode::OK, Json(batch)).into_response(),
        Err(error) => error_response(&error),
    }
}

/// Pagination query parameters for batch change listings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    start_from: Option<usize>,
    max_items: Option<usize>,
}

async fn list_batch_changes(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Response {
    let auth = match principal_from_headers(&headers) {
        Ok(auth) => auth,
        Err(response) => return response,
    };
    match state
        .service
        .list_batch_change_summaries(&auth, params.start_from, params.max_items)
        .await
    {
        Ok(summaries) => (StatusCode::OK, Json(summaries)).into_response(),
        Err(error) => error_response(&error),
    }
}

async fn ping() -> &'static str {
    PING_RESPONSE
}

async fn metrics() -> String {
    metrics_text()
}

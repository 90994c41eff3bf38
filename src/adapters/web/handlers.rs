//! HTTP request handlers for the JSON API.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::domain::error::TradebucketsError;
use crate::domain::operations;
use crate::domain::validation::TradeDraft;

use super::auth::{AuthSession, Credentials};
use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBucketRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub trades: Vec<TradeDraft>,
}

pub async fn create_bucket(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBucketRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = req.name.unwrap_or_default();
    if name.trim().is_empty() {
        return Err(ApiError::bad_request("Bucket name is required"));
    }

    let bucket =
        operations::create_bucket(&*state.store, &name, &req.trades).map_err(|err| match err {
            TradebucketsError::Validation { errors } => {
                ApiError::validation("Validation errors in trades", errors)
            }
            other => ApiError::from(other),
        })?;

    tracing::info!(bucket_id = %bucket.id, name = %bucket.name, "bucket created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Bucket created successfully", "bucket": bucket })),
    ))
}

pub async fn list_buckets(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let buckets = operations::list_buckets(&*state.store)?;
    let message = if buckets.is_empty() {
        "No buckets found"
    } else {
        "Buckets retrieved successfully"
    };
    Ok(Json(json!({ "message": message, "buckets": buckets })))
}

pub async fn get_bucket(
    State(state): State<Arc<AppState>>,
    Path(bucket_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bucket = operations::get_bucket(&*state.store, &bucket_id)?;
    Ok(Json(
        json!({ "message": "Bucket retrieved successfully", "bucket": bucket }),
    ))
}

pub async fn add_trade(
    State(state): State<Arc<AppState>>,
    Path(bucket_id): Path<String>,
    Json(draft): Json<TradeDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let bucket = operations::add_trade(&*state.store, &bucket_id, &draft)?;
    tracing::info!(bucket_id = %bucket.id, trades = bucket.trades.len(), "trade added");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Trade added successfully", "bucket": bucket })),
    ))
}

pub async fn update_trade(
    State(state): State<Arc<AppState>>,
    Path((bucket_id, trade_id)): Path<(String, String)>,
    Json(draft): Json<TradeDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let bucket = operations::update_trade(&*state.store, &bucket_id, &trade_id, &draft)?;
    tracing::info!(bucket_id = %bucket.id, trade_id = %trade_id, "trade updated");
    Ok(Json(
        json!({ "message": "Trade updated successfully", "bucket": bucket }),
    ))
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn login(
    mut auth_session: AuthSession,
    Json(creds): Json<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    let user = match auth_session.authenticate(creds).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Err(ApiError::new(
                StatusCode::UNAUTHORIZED,
                "Invalid username or password",
            ));
        }
        Err(_) => return Err(ApiError::internal("Authentication backend failure")),
    };

    if auth_session.login(&user).await.is_err() {
        return Err(ApiError::internal("Failed to establish session"));
    }

    tracing::info!(username = %user.username, "login");
    Ok(Json(json!({ "message": "Logged in" })))
}

pub async fn logout(mut auth_session: AuthSession) -> Result<impl IntoResponse, ApiError> {
    auth_session
        .logout()
        .await
        .map_err(|_| ApiError::internal("Failed to clear session"))?;
    Ok(Json(json!({ "message": "Logged out" })))
}

//! HTTP request handlers.

use super::types::HealthResponse;
use super::AppState;
use crate::error::IdentityError;
use crate::registry::ServiceInfo;
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        accounts: state.registry.count().await,
        loaded_at: state.registry.loaded_at().await.map(|t| t.to_rfc3339()),
    })
}

/// Basic information about the service.
///
/// GET /api/v1/info
pub async fn info(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(state.registry.info().clone())
}

/// List known account addresses in load order.
///
/// GET /api/v1/accounts
pub async fn list_accounts(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.registry.list_addresses().await)
}

/// Full keystore file for one account.
///
/// GET /api/v1/account/:address
pub async fn get_account(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Response, IdentityError> {
    let raw = state.registry.lookup(&address).await?;
    debug!(%address, bytes = raw.len(), "Serving keystore");

    Ok(([(header::CONTENT_TYPE, "application/json")], raw).into_response())
}

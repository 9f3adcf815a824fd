use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::TokenPairResponseData;
use crate::identity::errors::AuthError;
use crate::inbound::http::router::AppState;

/// Exchange a refresh token for a new token pair.
///
/// Extra fields are ignored, so a login response can be posted back as is.
pub async fn refresh_token(
    State(state): State<AppState>,
    payload: Result<Json<RefreshTokenRequestBody>, JsonRejection>,
) -> Result<ApiSuccess<TokenPairResponseData>, ApiError> {
    // No readable `refresh_token` means no token to accept.
    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!(status = %rejection.status(), "Refresh body rejected");
        ApiError::from(AuthError::InvalidToken)
    })?;

    state
        .auth_service
        .refresh(&body.refresh_token)
        .await
        .map_err(ApiError::from)
        .map(|ref pair| ApiSuccess::new(StatusCode::OK, pair.into()))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshTokenRequestBody {
    refresh_token: String,
}

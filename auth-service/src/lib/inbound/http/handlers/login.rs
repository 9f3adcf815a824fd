use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::TokenPairResponseData;
use crate::domain::identity::models::Credentials;
use crate::domain::identity::models::Password;
use crate::domain::identity::models::Username;
use crate::identity::errors::AuthError;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequestBody>, JsonRejection>,
) -> Result<ApiSuccess<TokenPairResponseData>, ApiError> {
    // A body with no usable username/password pair, or one that could never
    // have been registered, is just another pair of bad credentials.
    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!(status = %rejection.status(), "Login body rejected");
        ApiError::from(AuthError::InvalidCredentials)
    })?;
    let credentials = body
        .try_into_credentials()
        .ok_or_else(|| ApiError::from(AuthError::InvalidCredentials))?;

    state
        .auth_service
        .login(&credentials)
        .await
        .map_err(ApiError::from)
        .map(|ref pair| ApiSuccess::new(StatusCode::OK, pair.into()))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    username: String,
    password: String,
}

impl LoginRequestBody {
    fn try_into_credentials(self) -> Option<Credentials> {
        let username = Username::new(self.username).ok()?;
        let password = Password::new(self.password).ok()?;
        Some(Credentials::new(username, password))
    }
}

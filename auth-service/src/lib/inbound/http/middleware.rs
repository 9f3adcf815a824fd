use axum::extract::Request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use super::handlers::ApiError;
use crate::domain::identity::models::IdentityId;
use crate::inbound::http::router::AppState;

/// Extension type to store the authenticated identity in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity {
    pub identity_id: IdentityId,
}

/// Middleware that validates bearer access tokens and adds the identity to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token_from_header(&req)?.to_string();

    // Refresh tokens are rejected here as INVALID_TOKEN.
    let identity_id = state
        .auth_service
        .authenticate(&token)
        .await
        .map_err(|e| {
            tracing::warn!(code = e.code(), "Bearer token rejected");
            ApiError::from(e).into_response()
        })?;

    req.extensions_mut()
        .insert(AuthenticatedIdentity { identity_id });

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, Response> {
    let missing = |message: &str| {
        ApiError::new(StatusCode::UNAUTHORIZED, "INVALID_TOKEN", message).into_response()
    };

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| missing("Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| missing("Invalid Authorization header"))?;

    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            missing("Invalid Authorization header format. Expected: Bearer <token>")
        })
}

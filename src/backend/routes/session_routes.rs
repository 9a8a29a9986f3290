/**
 * Session Route Handlers
 *
 * Login and registration results carry a signed token. Browsers post that
 * token here to have it stored as an HTTP-only cookie, and come back before
 * it expires to have it re-issued.
 *
 * # Routes
 *
 * - `POST /api/session` - body `{"token": "..."}`, sets the cookie
 * - `POST /api/session/refresh` - reads the cookie, re-issues it when it
 *   expires within 30 minutes; 400 otherwise
 * - `DELETE /api/session` - clears the cookie
 * - `GET /health` - `{"status": "ok", "connections": n}`
 */

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::backend::auth::sessions::{cleared_cookie, session_cookie, token_from_cookie_header};
use crate::backend::auth::{IssuedToken, TokenIssuer};
use crate::backend::error::BackendError;
use crate::backend::realtime::HubHandle;

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub token: String,
}

/// Verify a token and set it as the session cookie
pub async fn store_session(
    State(tokens): State<TokenIssuer>,
    Json(request): Json<SessionRequest>,
) -> Result<impl IntoResponse, BackendError> {
    let claims = tokens.verify(&request.token)?;
    let issued = IssuedToken {
        token: request.token,
        expires_at: claims.exp,
    };

    info!("[Session] Cookie set for {}", claims.sub);
    Ok((
        [(header::SET_COOKIE, session_cookie(&issued))],
        Json(json!({ "username": claims.sub, "expiresAt": claims.exp })),
    ))
}

/// Re-issue the cookie token if it is inside the refresh window
pub async fn refresh_session(
    State(tokens): State<TokenIssuer>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, BackendError> {
    let token = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(token_from_cookie_header)
        .ok_or_else(|| BackendError::handler(StatusCode::UNAUTHORIZED, "No session cookie"))?;

    let issued = tokens.refresh(token)?;
    Ok((
        [(header::SET_COOKIE, session_cookie(&issued))],
        Json(json!({ "expiresAt": issued.expires_at })),
    ))
}

pub async fn clear_session() -> impl IntoResponse {
    ([(header::SET_COOKIE, cleared_cookie())], StatusCode::NO_CONTENT)
}

pub async fn health(State(hub): State<HubHandle>) -> Result<Json<serde_json::Value>, BackendError> {
    let connections = hub.connection_count().await?;
    Ok(Json(json!({ "status": "ok", "connections": connections })))
}

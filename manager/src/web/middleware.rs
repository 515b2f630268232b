//! Request guards for the web API

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    Json,
};
use serde_json::{json, Value};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::web::AppState;

/// Extractor that checks `Authorization: Bearer <token>` against the
/// configured cleanup token. Handlers taking it never run unauthenticated.
///
/// # Example
/// ```ignore
/// async fn my_handler(
///     _auth: CleanupAuth,
///     State(state): State<AppState>,
/// ) -> Response {
///     // token already validated
/// }
/// ```
pub struct CleanupAuth;

fn tokens_match(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

impl FromRequestParts<AppState> for CleanupAuth {
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "));

        let expected = state
            .config
            .cleanup
            .token
            .as_deref()
            .filter(|token| !token.is_empty());

        match (presented, expected) {
            (Some(presented), Some(expected)) if tokens_match(presented, expected) => {
                Ok(CleanupAuth)
            }
            _ => {
                warn!("Rejected cleanup request to {}: bad or missing token", parts.uri.path());
                Err((
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": "Unauthorized" })),
                ))
            }
        }
    }
}

/// Bearer token authentication for axum
///
/// [`jwt_auth_middleware`] guards protected routes: it reads
/// `Authorization: Bearer <token>`, validates the token with the shared
/// [`TokenService`] and inserts an [`AuthContext`] into the request
/// extensions. Any failure short-circuits with `401 Unauthorized` before the
/// handler runs.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use axum::{middleware, routing::get, Extension, Router};
/// use chrono::Duration;
/// use tasknest_shared::auth::jwt::TokenService;
/// use tasknest_shared::auth::middleware::{jwt_auth_middleware, AuthContext};
///
/// async fn whoami(Extension(auth): Extension<AuthContext>) -> String {
///     format!("user {}", auth.user_id)
/// }
///
/// let tokens = Arc::new(TokenService::new("a-secret-that-is-at-least-32-bytes!", Duration::hours(24)));
/// let app: Router = Router::new()
///     .route("/me", get(whoami))
///     .layer(middleware::from_fn_with_state(tokens, jwt_auth_middleware));
/// ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::jwt::{JwtError, TokenService};

/// Identity of the caller, available to handlers via `Extension<AuthContext>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: i64,
}

/// Reasons a request was not authenticated
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    #[error("{0}")]
    InvalidFormat(String),

    #[error("{0}")]
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": "unauthorized",
            "message": self.to_string(),
        });

        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
            _ => AuthError::InvalidToken("Invalid token".to_string()),
        }
    }
}

/// Extracts the raw token from `Authorization: Bearer <token>`
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Authorization header is not valid ASCII".to_string()))?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AuthError::InvalidFormat("Expected Bearer token".to_string())),
    }
}

/// Resolves the caller from request headers
pub fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;
    let claims = tokens.validate_token(token)?;
    let user_id = claims.user_id()?;

    Ok(AuthContext { user_id })
}

/// JWT authentication middleware
///
/// Install with `axum::middleware::from_fn_with_state(tokens, jwt_auth_middleware)`.
pub async fn jwt_auth_middleware(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let context = authenticate(req.headers(), &tokens).map_err(|e| {
        debug!(reason = %e, path = %req.uri().path(), "Rejected unauthenticated request");
        e
    })?;

    req.extensions_mut().insert(context);
    Ok(next.run(req).await)
}

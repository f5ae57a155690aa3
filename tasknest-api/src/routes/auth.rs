/// Account endpoints
///
/// - `POST /register` - create an account
/// - `POST /login` - exchange email and password for a bearer token

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tasknest_shared::usecase::Credentials;
use utoipa::ToSchema;

use crate::{
    app::AppState,
    error::ApiResult,
};

/// Register response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub id: i64,

    pub email: String,

    pub created_at: DateTime<Utc>,
}

/// Login response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Signed JWT for the `Authorization: Bearer` header
    pub access_token: String,

    /// Always `Bearer`
    #[schema(example = "Bearer")]
    pub token_type: String,

    pub expires_at: DateTime<Utc>,
}

/// Register a new user
///
/// # Errors
///
/// - `400 Bad Request`: Malformed JSON
/// - `409 Conflict`: Email already registered
/// - `422 Unprocessable Entity`: Invalid email or password shorter than 8 characters
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = Credentials,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Malformed JSON", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(credentials) = payload?;

    let user = state.users.register(credentials).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
        }),
    ))
}

/// Log in and receive an access token
///
/// Unknown email and wrong password produce the same 401.
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = Credentials,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Malformed JSON", body = crate::error::ErrorResponse),
        (status = 401, description = "Invalid email or password", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(credentials) = payload?;

    let issued = state.users.login(credentials).await?;

    Ok(Json(TokenResponse {
        access_token: issued.token,
        token_type: "Bearer".to_string(),
        expires_at: issued.expires_at,
    }))
}

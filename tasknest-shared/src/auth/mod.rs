/// Authentication primitives
///
/// - [`password`]: Argon2id hashing and verification
/// - [`jwt`]: HS256 token issuance and validation ([`jwt::TokenService`])
/// - [`middleware`]: axum middleware that turns a bearer token into an [`middleware::AuthContext`]

pub mod jwt;
pub mod middleware;
pub mod password;

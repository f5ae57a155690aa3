/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Registration and login
/// - `tasks`: Task CRUD (bearer token required)
/// - `docs`: OpenAPI document and Swagger UI

pub mod auth;
pub mod docs;
pub mod health;
pub mod tasks;

/// OpenAPI document and Swagger UI
///
/// - `GET /api-docs/openapi.json` - the generated OpenAPI 3 document
/// - `GET /swagger/` - Swagger UI pointed at that document (`/swagger`
///   redirects here)
///
/// The Swagger UI assets are embedded at build time and served locally.

use axum::Router;
use tasknest_shared::{
    models::task::{Task, TaskPatch},
    usecase::{Credentials, NewTaskInput},
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    app::AppState,
    error::{ErrorResponse, ValidationErrorDetail},
    routes::{auth, health, tasks},
};

pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(title = "Tasknest API", description = "Personal task management"),
    paths(
        health::health_check,
        auth::register,
        auth::login,
        tasks::create_task,
        tasks::list_tasks,
        tasks::get_task,
        tasks::update_task,
        tasks::delete_task,
        tasks::delete_all_tasks,
    ),
    components(schemas(
        Task,
        TaskPatch,
        NewTaskInput,
        Credentials,
        tasks::CreatedResponse,
        tasks::TaskPage,
        auth::RegisterResponse,
        auth::TokenResponse,
        health::HealthResponse,
        ErrorResponse,
        ValidationErrorDetail,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Liveness"),
        (name = "auth", description = "Registration and login"),
        (name = "tasks", description = "Task CRUD for the authenticated user")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn router() -> Router<AppState> {
    SwaggerUi::new("/swagger")
        .url(OPENAPI_PATH, ApiDoc::openapi())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in ["/health", "/register", "/login", "/tasks", "/tasks/{id}", "/tasks/all"] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected} in {paths:?}"
            );
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn test_openapi_document_serializes() {
        let json = serde_json::to_value(ApiDoc::openapi()).unwrap();

        assert_eq!(json["info"]["title"], "Tasknest API");
        assert!(json["components"]["schemas"]["ErrorResponse"].is_object());
    }
}

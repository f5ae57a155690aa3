/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tasknest_api::{app::{build_router, AppState}, config::Config};
/// use tasknest_shared::repository::{PgTaskRepository, PgUserRepository};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(
///     config,
///     Arc::new(PgTaskRepository::new(pool.clone())),
///     Arc::new(PgUserRepository::new(pool)),
///     None,
/// );
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use tasknest_shared::{
    auth::{jwt::TokenService, middleware::jwt_auth_middleware},
    cache::RedisClient,
    repository::{TaskRepository, UserRepository},
    usecase::{TaskUsecase, UserUsecase},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;

/// Shared application state
///
/// Cloned into every handler; all fields are reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub tasks: TaskUsecase,

    pub users: UserUsecase,

    /// Signs and verifies access tokens
    pub tokens: Arc<TokenService>,

    /// `None` when the cache is disabled or failed to warm up
    pub cache: Option<RedisClient>,

    pub config: Arc<Config>,
}

impl AppState {
    /// Wires use-cases over the given repositories
    pub fn new(
        config: Config,
        task_repo: Arc<dyn TaskRepository>,
        user_repo: Arc<dyn UserRepository>,
        cache: Option<RedisClient>,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(&config.jwt.secret, config.token_ttl()));

        Self {
            tasks: TaskUsecase::new(task_repo),
            users: UserUsecase::new(user_repo, tokens.clone()),
            tokens,
            cache,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET    /health                    # public
/// ├── POST   /register                  # public
/// ├── POST   /login                     # public
/// ├── /tasks                            # bearer token required
/// │   ├── POST   /
/// │   ├── GET    /?title=&done=&limit=&offset=
/// │   ├── DELETE /all
/// │   ├── GET    /:id
/// │   ├── PUT    /:id
/// │   └── DELETE /:id
/// ├── GET    /api-docs/openapi.json
/// └── GET    /swagger/*
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let task_routes = Router::new()
        .route(
            "/",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route("/all", delete(routes::tasks::delete_all_tasks))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.tokens.clone(),
            jwt_auth_middleware,
        ));

    let cors = cors_layer(&state.config.api.cors_origins);

    Router::new()
        .merge(public_routes)
        .nest("/tasks", task_routes)
        .merge(routes::docs::router())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

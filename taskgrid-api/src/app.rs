/// Application state and router builder
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /v1/                             # Identity-resolved API
///     ├── /users/...                   # Directory lookup and search
///     ├── /projects/...                # Projects, members, teams, timeline
///     ├── /tasks/...                   # Tasks, assignment, comments
///     ├── /teams/...                   # Teams and memberships
///     └── /workload/...                # Summaries, capacity, allocation
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Identity resolution (all /v1 routes)
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;
use crate::identity::identity_layer;
use crate::routes;
use taskgrid_core::directory::Directory;
use taskgrid_core::workload::engine::WorkloadEngine;

/// Shared application state
///
/// Cloned per request via Axum's `State` extractor; Arc keeps the clones
/// cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// User directory with the provisioning dedup cache
    pub directory: Arc<Directory>,

    /// Workload engine
    pub workload: Arc<WorkloadEngine>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            directory: Arc::new(Directory::new(db.clone())),
            workload: Arc::new(WorkloadEngine::new(db.clone())),
            db,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    // Health check (public, no identity)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route("/search", get(routes::users::search_users))
        .route("/me", get(routes::users::get_me))
        .route("/me", put(routes::users::update_me))
        .route("/:id", get(routes::users::get_user));

    let project_routes = Router::new()
        .route("/", post(routes::projects::create_project))
        .route("/", get(routes::projects::list_projects))
        .route("/:id", get(routes::projects::get_project))
        .route("/:id", put(routes::projects::update_project))
        .route("/:id", delete(routes::projects::delete_project))
        .route("/:id/members", get(routes::projects::list_members))
        .route("/:id/members", post(routes::projects::add_member))
        .route("/:id/members/:user_id", delete(routes::projects::remove_member))
        .route("/:id/tasks", get(routes::tasks::list_project_tasks))
        .route("/:id/teams/:team_id", post(routes::teams::add_team_to_project))
        .route("/:id/teams/:team_id", delete(routes::teams::remove_team_from_project))
        .route("/:id/timeline", get(routes::workload::project_timeline))
        .route("/:id/workload", get(routes::workload::team_summary));

    let task_routes = Router::new()
        .route("/", post(routes::tasks::create_task))
        .route("/assigned", get(routes::tasks::list_assigned_tasks))
        .route("/:id", get(routes::tasks::get_task))
        .route("/:id", put(routes::tasks::update_task))
        .route("/:id", delete(routes::tasks::delete_task))
        .route("/:id/assign", post(routes::tasks::assign_task))
        .route("/:id/suggestions", post(routes::tasks::suggest_assignees))
        .route("/:id/impact/:user_id", get(routes::tasks::preview_impact))
        .route("/:id/reschedule", post(routes::tasks::reschedule_task))
        .route("/:id/comments", get(routes::comments::list_comments))
        .route("/:id/comments", post(routes::comments::create_comment));

    let comment_routes = Router::new()
        .route("/:id", get(routes::comments::get_comment))
        .route("/:id", put(routes::comments::update_comment))
        .route("/:id", delete(routes::comments::delete_comment));

    let team_routes = Router::new()
        .route("/", post(routes::teams::create_team))
        .route("/mine", get(routes::teams::list_my_teams))
        .route("/search", get(routes::teams::search_teams))
        .route("/:id", get(routes::teams::get_team))
        .route("/:id", put(routes::teams::update_team))
        .route("/:id", delete(routes::teams::delete_team))
        .route("/:id/members", get(routes::teams::list_members))
        .route("/:id/members", post(routes::teams::add_member))
        .route("/:id/members/:user_id", delete(routes::teams::remove_member))
        .route("/:id/members/:user_id", put(routes::teams::update_member_role));

    let workload_routes = Router::new()
        .route("/users/:id/summary", get(routes::workload::user_summary))
        .route("/users/:id/capacity", get(routes::workload::user_capacity))
        .route("/users/:id/distribution", get(routes::workload::user_distribution))
        .route("/entries", post(routes::workload::allocate_entry))
        .route("/timeline", post(routes::workload::batch_timeline));

    // All /v1 routes run behind identity resolution.
    let v1_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes)
        .nest("/comments", comment_routes)
        .nest("/teams", team_routes)
        .nest("/workload", workload_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            identity_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

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
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

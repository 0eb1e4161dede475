/// Common test utilities for API integration tests
///
/// Requires a running PostgreSQL database. Set DATABASE_URL to run; without
/// it every test skips with a note.
use sqlx::PgPool;
use uuid::Uuid;

use taskgrid_api::app::{build_router, AppState};
use taskgrid_api::config::{ApiConfig, Config, DatabaseConfig};

/// Test context: a router wired to a real database
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    /// Identity headers for a fresh, auto-provisioned user
    pub subject: String,
    pub email: String,
}

impl TestContext {
    /// Creates a context, or None when DATABASE_URL is unset
    pub async fn new() -> Option<Self> {
        let url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                eprintln!("DATABASE_URL not set; skipping integration test");
                return None;
            }
        };

        let db = PgPool::connect(&url).await.expect("Failed to connect");

        sqlx::migrate!("../taskgrid-core/migrations")
            .run(&db)
            .await
            .expect("Failed to run migrations");

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url,
                max_connections: 5,
            },
        };

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        let tag = Uuid::new_v4();

        Some(TestContext {
            db,
            app,
            subject: format!("it-sub-{}", tag),
            email: format!("it-{}@example.com", tag),
        })
    }
}

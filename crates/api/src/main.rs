// Airsoft club API server
// Exposes the club actions behind the session and club authorization checks

mod config;
mod handlers;
mod routes;

use airsoft_actions::{register_all, ActionClient, ActionRegistry};
use airsoft_auth::{DatabaseSessionProvider, SessionProvider};
use airsoft_database::{ClubRepository, Database, SessionRepository};
use anyhow::Context;
use config::Config;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub struct AppState {
    pub db: Database,
    pub sessions: Arc<dyn SessionProvider>,
    pub registry: ActionRegistry,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,airsoft_api=debug,tower_http=debug".to_string()),
        )
        .init();

    tracing::info!("Starting airsoft API server v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env();
    tracing::info!("Server: {}:{}", config.server_host, config.server_port);

    // Database
    let database = Database::new(config.database.clone())
        .await
        .context("Failed to connect to database")?;
    database.ping().await.context("Database ping failed")?;
    tracing::info!("Database connected");

    if config.run_migrations {
        database.migrate().await.context("Failed to run migrations")?;
        tracing::info!("Migrations applied");
    }

    // Session provider
    let sessions: Arc<dyn SessionProvider> = Arc::new(DatabaseSessionProvider::new(
        &database,
        config.session_cookie.clone(),
    ));
    spawn_session_cleanup(&database, config.session_cleanup_interval);

    // Actions
    let client = ActionClient::new(Arc::new(ClubRepository::new(database.pool().clone())));
    let mut registry = ActionRegistry::new(client);
    register_all(&mut registry, &database, &config.handlers);
    for action in registry.descriptors() {
        tracing::debug!("Registered action {} ({:?})", action.name, action.scope);
    }

    let state = Arc::new(AppState {
        db: database,
        sessions,
        registry,
    });

    let app = routes::create_router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    tracing::info!("Routes configured:");
    tracing::info!("   GET  /health");
    tracing::info!("   GET  /api/actions");
    tracing::info!("   POST /api/actions/:name");

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server ready at http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Periodically delete expired sessions
fn spawn_session_cleanup(db: &Database, interval_secs: u64) {
    let sessions = SessionRepository::new(db.pool().clone());
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        loop {
            interval.tick().await;
            match sessions.delete_expired().await {
                Ok(0) => {}
                Ok(removed) => tracing::debug!("Session cleanup: removed {} expired sessions", removed),
                Err(e) => tracing::warn!("Session cleanup failed: {}", e),
            }
        }
    });
}

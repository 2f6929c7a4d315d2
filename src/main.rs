use film_manager::{
    AppState,
    config::{AppConfig, Env},
    create_router, log_routes,
    models::{Identity, Role},
    repository::{CredentialStoreState, InMemoryCredentialStore, PostgresCredentialStore},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, initializes logging, connects the credential store and serves
/// the HTTP API.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Configuration (fail-fast on missing production secrets).
    dotenv::dotenv().ok();
    let config = AppConfig::load()?;

    // 2. Logging: RUST_LOG wins, otherwise local-friendly defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "film_manager=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Credential store: Postgres when configured, otherwise a seeded in-memory store.
    let repo: CredentialStoreState = match &config.db_url {
        Some(db_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(db_url)
                .await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Connected to Postgres credential store.");
            Arc::new(PostgresCredentialStore::new(pool))
        }
        None => {
            tracing::warn!(
                username = %config.admin_username,
                "DATABASE_URL not set: using in-memory credential store with a seeded admin"
            );
            let admin = Identity::new(
                config.admin_username.clone(),
                config.admin_password.clone(),
                [Role::Admin],
            );
            Arc::new(InMemoryCredentialStore::with_identities([admin]))
        }
    };

    // 4. Router and server startup.
    let port = config.port;
    let app = create_router(AppState::new(repo, config));
    log_routes();

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Listening on 0.0.0.0:{}", port);
    tracing::info!("API Documentation (Swagger UI) available at: http://localhost:{}/swagger-ui", port);

    axum::serve(listener, app).await?;
    Ok(())
}

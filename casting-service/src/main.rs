use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use casting_service::config::load_service_config;
use casting_service::store::PgCastingStore;
use casting_service::{cors_layer, router, AppState};
use common_auth::JwtVerifier;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_service_config().context("Failed to load casting-service configuration")?;

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to DATABASE_URL")?;
    // Ensure database schema is up to date before serving traffic
    sqlx::migrate!("./migrations").run(&db).await?;

    let verifier = JwtVerifier::new(config.jwt.clone());
    info!(
        issuer = %config.jwt.issuer(),
        audience = %config.jwt.audience,
        jwks_url = %verifier.jwks_fetcher().url(),
        jwks_cache_ttl = ?config.jwt.jwks_cache_ttl,
        "JWT verification configured"
    );

    let state = AppState::new(Arc::new(PgCastingStore::new(db)), Arc::new(verifier));
    let app = router(state).layer(cors_layer(&config.cors_allowed_origins));

    let addr = SocketAddr::from((config.host, config.port));
    info!(%addr, "starting casting-service");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

use pact_registry::{app, config::AppConfig, db, state::AppState, telemetry::init_tracing};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env();
    init_tracing(config.log_format);

    let pool = db::connect(&config.database_url, config.db_max_connections)
        .await
        .map_err(|err| {
            tracing::error!(
                error = %err,
                database_url = %config.database_url,
                "database initialization failed"
            );
            err
        })?;

    let addr: SocketAddr = config.bind_addr.parse()?;
    tracing::info!(%addr, base_url = %config.base_url, "pact registry listening");

    let state = AppState { pool, config };
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

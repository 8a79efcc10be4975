use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use skyseat_api::{flight_app, init_tracing, FlightState};
use skyseat_core::FlightInventoryStore;
use skyseat_store::{app_config::Config, DbClient, MemoryFlightStore, PostgresFlightStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("skyseat_api=debug,skyseat_inventory=info,tower_http=debug,axum::rejection=trace");

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting flight service on port {}", config.flight_server.port);

    let store: Arc<dyn FlightInventoryStore> = match &config.database.url {
        Some(url) => {
            let db = DbClient::new(url, &config.database)
                .await
                .context("Failed to connect to Postgres")?;
            db.migrate().await.context("Failed to run migrations")?;
            Arc::new(PostgresFlightStore::new(db.pool.clone()))
        }
        None => {
            tracing::warn!("No database.url configured, flights are kept in memory");
            Arc::new(MemoryFlightStore::new())
        }
    };

    let app = flight_app(FlightState::new(store, config.reservation.lock_timeout()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.flight_server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use skyseat_api::{booking_app, init_tracing, BookingState};
use skyseat_booking::{BookingOrchestrator, BreakerFlightClient, CircuitBreaker, HttpFlightClient};
use skyseat_core::BookingRepository;
use skyseat_store::{app_config::Config, DbClient, MemoryBookingRepository, PostgresBookingRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("skyseat_api=debug,skyseat_booking=info,tower_http=debug,axum::rejection=trace");

    let config = Config::load().context("Failed to load config")?;
    tracing::info!(
        "Starting booking service on port {} (flight service at {})",
        config.booking_server.port,
        config.flight_client.base_url
    );

    let bookings: Arc<dyn BookingRepository> = match &config.database.url {
        Some(url) => {
            let db = DbClient::new(url, &config.database)
                .await
                .context("Failed to connect to Postgres")?;
            db.migrate().await.context("Failed to run migrations")?;
            Arc::new(PostgresBookingRepository::new(db.pool.clone()))
        }
        None => {
            tracing::warn!("No database.url configured, bookings are kept in memory");
            Arc::new(MemoryBookingRepository::new())
        }
    };

    let http = HttpFlightClient::new(
        &config.flight_client.base_url,
        Duration::from_secs(config.flight_client.timeout_secs),
    )
    .context("Failed to build flight service client")?;
    let flights = BreakerFlightClient::new(
        http,
        CircuitBreaker::new(
            "flight-service",
            config.flight_client.breaker_threshold,
            Duration::from_secs(config.flight_client.breaker_reset_secs),
        ),
    );

    let state = BookingState {
        orchestrator: Arc::new(BookingOrchestrator::new(Arc::new(flights), bookings)),
    };
    let app = booking_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.booking_server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

use axum::{http::Method, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod bookings;
pub mod error;
pub mod flights;
pub mod state;

pub use state::{BookingState, FlightState};

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ])
}

/// Router of the flight service.
pub fn flight_app(state: FlightState) -> Router {
    Router::new()
        .merge(flights::routes())
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router of the booking service.
pub fn booking_app(state: BookingState) -> Router {
    Router::new()
        .merge(bookings::routes())
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

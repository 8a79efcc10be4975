pub mod client;
pub mod resiliency;
pub mod orchestrator;

pub use client::{FlightClient, HttpFlightClient};
pub use resiliency::{BreakerFlightClient, CircuitBreaker, CircuitState};
pub use orchestrator::{BookingError, BookingOrchestrator};

pub mod app_config;
pub mod database;
pub mod flight_repo;
pub mod booking_repo;
pub mod memory;

pub use database::DbClient;
pub use flight_repo::PostgresFlightStore;
pub use booking_repo::PostgresBookingRepository;
pub use memory::{MemoryBookingRepository, MemoryFlightStore};

pub mod error;
pub mod seat_map;
pub mod flight;
pub mod search;
pub mod booking;
pub mod events;
pub mod reservation;
pub mod repository;

pub use error::{ErrorBody, InventoryError, InventoryResult};
pub use seat_map::{Seat, SeatMap};
pub use flight::{Flight, FlightSummary, NewFlight};
pub use booking::{Booking, CreateBookingRequest};
pub use events::SeatsReservedEvent;
pub use reservation::{ReserveSeatsRequest, ReserveSeatsResponse};
pub use repository::{BookingRepository, BoxError, FlightHold, FlightInventoryStore};

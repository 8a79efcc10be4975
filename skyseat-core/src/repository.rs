use async_trait::async_trait;
use uuid::Uuid;

use crate::booking::Booking;
use crate::flight::Flight;
use crate::search::FlightSearchQuery;
use crate::seat_map::SeatMap;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Durable keeper of flights and their seat maps.
#[async_trait]
pub trait FlightInventoryStore: Send + Sync {
    async fn create_flight(&self, flight: &Flight) -> Result<(), BoxError>;

    /// Point-in-time read. Never waits on an outstanding hold.
    async fn read(&self, flight_id: Uuid) -> Result<Option<Flight>, BoxError>;

    /// Flights on a route and date that still have free seats.
    async fn search(&self, query: &FlightSearchQuery) -> Result<Vec<Flight>, BoxError>;

    /// Take the exclusive hold on one flight.
    ///
    /// Waits while another hold on the same id is outstanding; holds on other
    /// flights are unaffected. Returns `None` immediately for an unknown id.
    async fn lock_for_update(&self, flight_id: Uuid) -> Result<Option<Box<dyn FlightHold>>, BoxError>;
}

/// An exclusive hold on one flight record.
///
/// Dropping the hold without calling [`FlightHold::commit`] releases it and
/// leaves the stored record untouched.
#[async_trait]
pub trait FlightHold: Send {
    /// State of the flight as read under the hold.
    fn snapshot(&self) -> &Flight;

    /// Replace the seat map and available count together, then release.
    async fn commit(self: Box<Self>, seat_map: SeatMap, available_seats: u32) -> Result<(), BoxError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create_booking(&self, booking: &Booking) -> Result<(), BoxError>;

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, BoxError>;
}

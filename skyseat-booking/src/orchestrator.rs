use std::sync::Arc;

use chrono::Utc;
use skyseat_core::{Booking, BookingRepository, CreateBookingRequest, InventoryError};
use tracing::{error, info};
use uuid::Uuid;

use crate::client::FlightClient;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// Verdict from the flight service, unchanged.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Seats were claimed but the booking row could not be written. The seats
    /// stay reserved; there is no compensation path.
    #[error("Seats {seats:?} reserved on flight {flight_id} but booking was not saved: {reason}")]
    Persistence {
        flight_id: Uuid,
        seats: Vec<String>,
        reason: String,
    },
}

/// Creates bookings: existence check, seat reservation on the flight
/// service, then the booking row. Never retries.
pub struct BookingOrchestrator {
    flights: Arc<dyn FlightClient>,
    bookings: Arc<dyn BookingRepository>,
}

impl BookingOrchestrator {
    pub fn new(flights: Arc<dyn FlightClient>, bookings: Arc<dyn BookingRepository>) -> Self {
        Self { flights, bookings }
    }

    pub async fn create_booking(&self, req: CreateBookingRequest) -> Result<Booking, BookingError> {
        if req.passenger_name.trim().is_empty() {
            return Err(InventoryError::InvalidRequest("passenger_name must not be empty".into()).into());
        }
        if req.seats.is_empty() {
            return Err(InventoryError::InvalidRequest("at least one seat is required".into()).into());
        }

        let flight = self
            .flights
            .get_flight(req.flight_id)
            .await?
            .ok_or_else(|| InventoryError::NotFound(format!("flight {}", req.flight_id)))?;

        // Priced before any seat is claimed.
        let price_amount = i64::try_from(req.seats.len())
            .ok()
            .and_then(|n| flight.price_amount.checked_mul(n))
            .ok_or_else(|| InventoryError::InvalidRequest("booking price overflows".into()))?;

        let seats = self.flights.reserve_seats(req.flight_id, &req.seats).await?;

        let booking = Booking {
            id: Uuid::new_v4(),
            flight_id: req.flight_id,
            passenger_name: req.passenger_name,
            seats,
            price_amount,
            price_currency: flight.price_currency,
            created_at: Utc::now(),
        };

        if let Err(e) = self.bookings.create_booking(&booking).await {
            error!(
                "Seats {:?} on flight {} reserved but booking {} failed to save: {}",
                booking.seats, booking.flight_id, booking.id, e
            );
            return Err(BookingError::Persistence {
                flight_id: booking.flight_id,
                seats: booking.seats,
                reason: e.to_string(),
            });
        }

        info!("Booking {} created for flight {} seats {:?}", booking.id, booking.flight_id, booking.seats);
        Ok(booking)
    }

    pub async fn get_booking(&self, id: Uuid) -> Result<Booking, BookingError> {
        self.bookings
            .get_booking(id)
            .await
            .map_err(InventoryError::dependency)?
            .ok_or_else(|| InventoryError::NotFound(format!("booking {}", id)).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime};
    use skyseat_core::{BoxError, FlightSummary, InventoryResult};
    use skyseat_store::MemoryBookingRepository;
    use std::sync::Mutex;

    /// Flight service double: one known flight, scripted reservation result.
    struct StubFlights {
        flight: FlightSummary,
        reserve_result: InventoryResult<Vec<String>>,
        reserve_calls: Mutex<Vec<Vec<String>>>,
    }

    impl StubFlights {
        fn new(reserve_result: InventoryResult<Vec<String>>) -> Self {
            Self {
                flight: FlightSummary {
                    id: Uuid::new_v4(),
                    flight_number: "SU100".to_string(),
                    origin: "SVO".to_string(),
                    destination: "LED".to_string(),
                    departure_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                    departure_time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
                    price_amount: 7_500,
                    price_currency: "EUR".to_string(),
                    available_seats: 10,
                },
                reserve_result,
                reserve_calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl FlightClient for StubFlights {
        async fn get_flight(&self, flight_id: Uuid) -> InventoryResult<Option<FlightSummary>> {
            Ok((flight_id == self.flight.id).then(|| self.flight.clone()))
        }

        async fn reserve_seats(&self, _flight_id: Uuid, seats: &[String]) -> InventoryResult<Vec<String>> {
            self.reserve_calls.lock().unwrap().push(seats.to_vec());
            self.reserve_result.clone()
        }
    }

    struct BrokenRepo;

    #[async_trait]
    impl BookingRepository for BrokenRepo {
        async fn create_booking(&self, _booking: &Booking) -> Result<(), BoxError> {
            Err("connection closed".into())
        }

        async fn get_booking(&self, _id: Uuid) -> Result<Option<Booking>, BoxError> {
            Err("connection closed".into())
        }
    }

    fn request(flight_id: Uuid, seats: &[&str]) -> CreateBookingRequest {
        CreateBookingRequest {
            flight_id,
            passenger_name: "Anna Smirnova".to_string(),
            seats: seats.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_booking_priced_per_seat() {
        let flights = Arc::new(StubFlights::new(Ok(vec!["1A".into(), "1B".into()])));
        let repo = Arc::new(MemoryBookingRepository::new());
        let orchestrator = BookingOrchestrator::new(flights.clone(), repo.clone());

        let booking = orchestrator.create_booking(request(flights.flight.id, &["1A", "1B"])).await.unwrap();
        assert_eq!(booking.price_amount, 15_000);
        assert_eq!(booking.price_currency, "EUR");
        assert_eq!(booking.seats, vec!["1A", "1B"]);

        assert_eq!(orchestrator.get_booking(booking.id).await.unwrap(), booking);
    }

    #[tokio::test]
    async fn test_unknown_flight_skips_reservation() {
        let flights = Arc::new(StubFlights::new(Ok(vec!["1A".into()])));
        let repo = Arc::new(MemoryBookingRepository::new());
        let orchestrator = BookingOrchestrator::new(flights.clone(), repo.clone());

        let err = orchestrator.create_booking(request(Uuid::new_v4(), &["1A"])).await.unwrap_err();
        assert!(matches!(err, BookingError::Inventory(InventoryError::NotFound(_))));
        assert!(flights.reserve_calls.lock().unwrap().is_empty());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_reservation_failure_is_surfaced_unchanged() {
        let flights = Arc::new(StubFlights::new(Err(InventoryError::SeatUnavailable("1B".into()))));
        let repo = Arc::new(MemoryBookingRepository::new());
        let orchestrator = BookingOrchestrator::new(flights.clone(), repo.clone());

        let err = orchestrator.create_booking(request(flights.flight.id, &["1B"])).await.unwrap_err();
        assert!(matches!(err, BookingError::Inventory(InventoryError::SeatUnavailable(ref s)) if s == "1B"));
        assert_eq!(err.to_string(), "Seat unavailable: 1B");
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_flight_service() {
        let flights = Arc::new(StubFlights::new(Ok(vec![])));
        let repo = Arc::new(MemoryBookingRepository::new());
        let orchestrator = BookingOrchestrator::new(flights.clone(), repo);

        let mut blank = request(flights.flight.id, &["1A"]);
        blank.passenger_name = "  ".to_string();
        assert!(orchestrator.create_booking(blank).await.is_err());
        assert!(orchestrator.create_booking(request(flights.flight.id, &[])).await.is_err());
        assert!(flights.reserve_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persistence_failure_reports_reserved_seats() {
        let flights = Arc::new(StubFlights::new(Ok(vec!["3C".into()])));
        let orchestrator = BookingOrchestrator::new(flights.clone(), Arc::new(BrokenRepo));

        let err = orchestrator.create_booking(request(flights.flight.id, &["3C"])).await.unwrap_err();
        match err {
            BookingError::Persistence { flight_id, seats, reason } => {
                assert_eq!(flight_id, flights.flight.id);
                assert_eq!(seats, vec!["3C"]);
                assert_eq!(reason, "connection closed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_price_overflow_rejected_before_reservation() {
        let mut stub = StubFlights::new(Ok(vec!["1A".into(), "1B".into()]));
        stub.flight.price_amount = i64::MAX;
        let flights = Arc::new(stub);
        let repo = Arc::new(MemoryBookingRepository::new());
        let orchestrator = BookingOrchestrator::new(flights.clone(), repo.clone());

        let err = orchestrator.create_booking(request(flights.flight.id, &["1A", "1B"])).await.unwrap_err();
        assert!(matches!(err, BookingError::Inventory(InventoryError::InvalidRequest(_))));
        assert!(flights.reserve_calls.lock().unwrap().is_empty());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_missing_booking_is_not_found() {
        let orchestrator = BookingOrchestrator::new(
            Arc::new(StubFlights::new(Ok(vec![]))),
            Arc::new(MemoryBookingRepository::new()),
        );
        let err = orchestrator.get_booking(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, BookingError::Inventory(InventoryError::NotFound(_))));
    }
}

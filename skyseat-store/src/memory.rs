use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use skyseat_core::search::FlightSearchQuery;
use skyseat_core::{Booking, BookingRepository, BoxError, Flight, FlightHold, FlightInventoryStore, SeatMap};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

/// One flight's storage cell.
///
/// `gate` is the exclusive hold. `record` is the committed state and is only
/// locked for the instant of a copy or a replace, so readers never queue
/// behind a hold.
struct FlightSlot {
    gate: Arc<Mutex<()>>,
    record: RwLock<Flight>,
}

/// In-process flight inventory keyed by flight id.
#[derive(Default)]
pub struct MemoryFlightStore {
    flights: RwLock<HashMap<Uuid, Arc<FlightSlot>>>,
}

impl MemoryFlightStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, flight_id: Uuid) -> Option<Arc<FlightSlot>> {
        self.flights.read().await.get(&flight_id).cloned()
    }
}

#[async_trait]
impl FlightInventoryStore for MemoryFlightStore {
    async fn create_flight(&self, flight: &Flight) -> Result<(), BoxError> {
        let mut flights = self.flights.write().await;
        if flights.contains_key(&flight.id) {
            return Err(format!("flight {} already exists", flight.id).into());
        }
        flights.insert(
            flight.id,
            Arc::new(FlightSlot {
                gate: Arc::new(Mutex::new(())),
                record: RwLock::new(flight.clone()),
            }),
        );
        Ok(())
    }

    async fn read(&self, flight_id: Uuid) -> Result<Option<Flight>, BoxError> {
        match self.slot(flight_id).await {
            Some(slot) => Ok(Some(slot.record.read().await.clone())),
            None => Ok(None),
        }
    }

    async fn search(&self, query: &FlightSearchQuery) -> Result<Vec<Flight>, BoxError> {
        let slots: Vec<Arc<FlightSlot>> = self.flights.read().await.values().cloned().collect();

        let mut found = Vec::new();
        for slot in slots {
            let flight = slot.record.read().await;
            if flight.origin == query.origin
                && flight.destination == query.destination
                && flight.departure_date == query.departure_date
                && flight.available_seats > 0
            {
                found.push(flight.clone());
            }
        }
        found.sort_by_key(|f| f.departure_time);
        Ok(found)
    }

    async fn lock_for_update(&self, flight_id: Uuid) -> Result<Option<Box<dyn FlightHold>>, BoxError> {
        let Some(slot) = self.slot(flight_id).await else {
            return Ok(None);
        };

        let guard = slot.gate.clone().lock_owned().await;
        let snapshot = slot.record.read().await.clone();

        Ok(Some(Box::new(MemoryHold {
            slot,
            snapshot,
            _guard: guard,
        })))
    }
}

struct MemoryHold {
    slot: Arc<FlightSlot>,
    snapshot: Flight,
    // Released on drop, after any commit has landed.
    _guard: OwnedMutexGuard<()>,
}

#[async_trait]
impl FlightHold for MemoryHold {
    fn snapshot(&self) -> &Flight {
        &self.snapshot
    }

    async fn commit(self: Box<Self>, seat_map: SeatMap, available_seats: u32) -> Result<(), BoxError> {
        let mut record = self.slot.record.write().await;
        record.seat_map = seat_map;
        record.available_seats = available_seats;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryBookingRepository {
    bookings: RwLock<HashMap<Uuid, Booking>>,
}

impl MemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.bookings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.bookings.read().await.is_empty()
    }
}

#[async_trait]
impl BookingRepository for MemoryBookingRepository {
    async fn create_booking(&self, booking: &Booking) -> Result<(), BoxError> {
        self.bookings.write().await.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, BoxError> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }
}

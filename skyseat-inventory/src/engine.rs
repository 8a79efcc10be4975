use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use skyseat_core::{Flight, FlightInventoryStore, InventoryError, InventoryResult, SeatsReservedEvent};
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

/// Sole writer of seat state.
///
/// Every reservation runs validate-then-commit under the store's exclusive
/// hold for that one flight, so reservations on the same flight are applied
/// one after another and reservations on different flights run in parallel.
#[derive(Clone)]
pub struct ReservationEngine {
    store: Arc<dyn FlightInventoryStore>,
    lock_timeout: Option<Duration>,
    events: Option<broadcast::Sender<SeatsReservedEvent>>,
}

impl ReservationEngine {
    pub fn new(store: Arc<dyn FlightInventoryStore>) -> Self {
        Self {
            store,
            lock_timeout: None,
            events: None,
        }
    }

    /// Give up waiting for the flight hold after `timeout`.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }

    /// Publish a [`SeatsReservedEvent`] after every commit.
    pub fn with_events(mut self, tx: broadcast::Sender<SeatsReservedEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn store(&self) -> &Arc<dyn FlightInventoryStore> {
        &self.store
    }

    /// Atomically claim `requested` seats on a flight.
    ///
    /// Returns the claimed labels in request order. On any error nothing has
    /// been written.
    pub async fn reserve(&self, flight_id: Uuid, requested: &[String]) -> InventoryResult<Vec<String>> {
        validate_request(requested)?;

        let acquire = self.store.lock_for_update(flight_id);
        let hold = match self.lock_timeout {
            Some(timeout) => tokio::time::timeout(timeout, acquire).await.map_err(|_| {
                warn!("Timed out after {:?} waiting for hold on flight {}", timeout, flight_id);
                InventoryError::DependencyFailure(format!("timed out waiting for flight {}", flight_id))
            })?,
            None => acquire.await,
        }
        .map_err(|e| {
            warn!("Failed to lock flight {}: {}", flight_id, e);
            InventoryError::dependency(e)
        })?
        .ok_or_else(|| InventoryError::NotFound(format!("flight {}", flight_id)))?;

        // Everything below sees the snapshot taken under the hold. Returning
        // early drops the hold, which releases it without a write.
        let snapshot = hold.snapshot();
        if let Err(e) = check_seats(snapshot, requested) {
            info!("Rejected reservation on flight {}: {}", flight_id, e);
            return Err(e);
        }

        let mut seat_map = snapshot.seat_map.clone();
        seat_map.mark_occupied(requested.iter().map(String::as_str));
        let remaining = snapshot.available_seats - requested.len() as u32;
        debug_assert_eq!(remaining as usize, seat_map.count_available());

        hold.commit(seat_map, remaining).await.map_err(|e| {
            warn!("Failed to commit reservation on flight {}: {}", flight_id, e);
            InventoryError::dependency(e)
        })?;

        info!("Reserved {:?} on flight {}, {} seat(s) left", requested, flight_id, remaining);

        if let Some(tx) = &self.events {
            // No subscribers is fine.
            let _ = tx.send(SeatsReservedEvent {
                flight_id,
                seats: requested.to_vec(),
                available_seats: remaining,
                reserved_at: Utc::now().timestamp(),
            });
        }

        Ok(requested.to_vec())
    }
}

fn validate_request(requested: &[String]) -> InventoryResult<()> {
    if requested.is_empty() {
        return Err(InventoryError::InvalidRequest("at least one seat is required".into()));
    }

    let mut seen = HashSet::with_capacity(requested.len());
    for label in requested {
        if label.trim().is_empty() {
            return Err(InventoryError::InvalidRequest("seat labels must not be empty".into()));
        }
        if !seen.insert(label.as_str()) {
            return Err(InventoryError::InvalidRequest(format!("seat {} requested more than once", label)));
        }
    }
    Ok(())
}

/// Capacity first, then each seat in request order.
fn check_seats(flight: &Flight, requested: &[String]) -> InventoryResult<()> {
    let wanted = u32::try_from(requested.len()).unwrap_or(u32::MAX);
    if wanted > flight.available_seats {
        return Err(InventoryError::InsufficientCapacity {
            requested: wanted,
            available: flight.available_seats,
        });
    }

    for label in requested {
        match flight.seat_map.find(label) {
            Some(seat) if seat.available => {}
            _ => return Err(InventoryError::SeatUnavailable(label.clone())),
        }
    }
    Ok(())
}

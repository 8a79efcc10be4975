use std::sync::Arc;
use std::time::Duration;

use skyseat_booking::BookingOrchestrator;
use skyseat_core::{FlightInventoryStore, SeatsReservedEvent};
use skyseat_inventory::ReservationEngine;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct FlightState {
    pub store: Arc<dyn FlightInventoryStore>,
    pub engine: ReservationEngine,
    pub events_tx: broadcast::Sender<SeatsReservedEvent>,
}

impl FlightState {
    pub fn new(store: Arc<dyn FlightInventoryStore>, lock_timeout: Option<Duration>) -> Self {
        let (events_tx, _) = broadcast::channel(256);
        let mut engine = ReservationEngine::new(store.clone()).with_events(events_tx.clone());
        if let Some(timeout) = lock_timeout {
            engine = engine.with_lock_timeout(timeout);
        }
        Self { store, engine, events_tx }
    }
}

#[derive(Clone)]
pub struct BookingState {
    pub orchestrator: Arc<BookingOrchestrator>,
}

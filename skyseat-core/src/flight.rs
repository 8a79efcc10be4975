use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{NaiveDate, NaiveTime};

use crate::error::{InventoryError, InventoryResult};
use crate::seat_map::SeatMap;

/// A scheduled flight together with its seat inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub id: Uuid,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub departure_time: NaiveTime,
    /// Per-seat fare in minor currency units.
    pub price_amount: i64,
    pub price_currency: String,
    pub available_seats: u32,
    pub seat_map: SeatMap,
}

impl Flight {
    /// Counter and map agree (available count equals free seats).
    pub fn is_consistent(&self) -> bool {
        self.available_seats as usize == self.seat_map.count_available()
    }
}

/// Creation payload for a flight.
///
/// Seats come either as an explicit label list or as a count that is expanded
/// into the standard six-abreast layout.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFlight {
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub departure_time: NaiveTime,
    pub price_amount: i64,
    #[serde(default = "default_currency")]
    pub price_currency: String,
    #[serde(default)]
    pub seats: Option<Vec<String>>,
    #[serde(default)]
    pub seat_count: Option<u32>,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Largest cabin a flight may be created with.
pub const MAX_SEATS: usize = 1000;

impl NewFlight {
    pub fn into_flight(self) -> InventoryResult<Flight> {
        for (field, value) in [
            ("flight_number", &self.flight_number),
            ("origin", &self.origin),
            ("destination", &self.destination),
        ] {
            if value.trim().is_empty() {
                return Err(InventoryError::InvalidRequest(format!("{} must not be empty", field)));
            }
        }
        if self.price_amount < 0 {
            return Err(InventoryError::InvalidRequest("price_amount must not be negative".into()));
        }

        let seat_map = match (self.seats, self.seat_count) {
            (Some(labels), None) => {
                if labels.len() > MAX_SEATS {
                    return Err(too_many_seats());
                }
                if labels.iter().any(|l| l.trim().is_empty()) {
                    return Err(InventoryError::InvalidRequest("seat labels must not be empty".into()));
                }
                SeatMap::from_labels(labels.into_iter().map(|l| l.trim().to_string()))
                    .map_err(|dup| InventoryError::InvalidRequest(format!("duplicate seat label {}", dup)))?
            }
            (None, Some(count)) if count as usize > MAX_SEATS => return Err(too_many_seats()),
            (None, Some(count)) => SeatMap::with_standard_layout(count),
            _ => {
                return Err(InventoryError::InvalidRequest(
                    "exactly one of seats or seat_count is required".into(),
                ))
            }
        };

        if seat_map.is_empty() {
            return Err(InventoryError::InvalidRequest("a flight needs at least one seat".into()));
        }

        Ok(Flight {
            id: Uuid::new_v4(),
            flight_number: self.flight_number,
            origin: self.origin,
            destination: self.destination,
            departure_date: self.departure_date,
            departure_time: self.departure_time,
            price_amount: self.price_amount,
            price_currency: self.price_currency,
            available_seats: seat_map.len() as u32,
            seat_map,
        })
    }
}

fn too_many_seats() -> InventoryError {
    InventoryError::InvalidRequest(format!("a flight holds at most {} seats", MAX_SEATS))
}

/// Flight details without the seat map; what the flight service returns for
/// lookups and searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSummary {
    pub id: Uuid,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub departure_time: NaiveTime,
    pub price_amount: i64,
    pub price_currency: String,
    pub available_seats: u32,
}

impl From<&Flight> for FlightSummary {
    fn from(f: &Flight) -> Self {
        Self {
            id: f.id,
            flight_number: f.flight_number.clone(),
            origin: f.origin.clone(),
            destination: f.destination.clone(),
            departure_date: f.departure_date,
            departure_time: f.departure_time,
            price_amount: f.price_amount,
            price_currency: f.price_currency.clone(),
            available_seats: f.available_seats,
        }
    }
}

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct FlightSearchQuery {
    pub origin: String,
    pub destination: String,
    pub departure_date: chrono::NaiveDate,
}

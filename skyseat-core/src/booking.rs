use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub flight_id: Uuid,
    pub passenger_name: String,
    pub seats: Vec<String>,
    pub price_amount: i64,
    pub price_currency: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub flight_id: Uuid,
    pub passenger_name: String,
    pub seats: Vec<String>,
}

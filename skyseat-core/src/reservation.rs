use serde::{Deserialize, Serialize};

/// Body of `POST /flights/{id}/reserve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveSeatsRequest {
    pub seats_to_book: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveSeatsResponse {
    pub status: String,
    pub seats: Vec<String>,
}

impl ReserveSeatsResponse {
    pub fn reserved(seats: Vec<String>) -> Self {
        Self { status: "reserved".to_string(), seats }
    }
}

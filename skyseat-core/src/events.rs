use uuid::Uuid;

/// Emitted after a reservation has been committed.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct SeatsReservedEvent {
    pub flight_id: Uuid,
    pub seats: Vec<String>,
    pub available_seats: u32,
    pub reserved_at: i64,
}

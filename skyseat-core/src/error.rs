use serde::{Deserialize, Serialize};

/// Failure kinds shared by the reservation path and its callers.
///
/// The value round-trips through JSON so the booking service can surface the
/// flight service's verdict unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Insufficient capacity: requested {requested}, available {available}")]
    InsufficientCapacity {
        requested: u32,
        available: u32,
    },

    #[error("Seat unavailable: {0}")]
    SeatUnavailable(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Dependency failure: {0}")]
    DependencyFailure(String),
}

impl InventoryError {
    /// Only infrastructure failures may be retried by a caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, InventoryError::DependencyFailure(_))
    }

    pub fn dependency(err: impl std::fmt::Display) -> Self {
        InventoryError::DependencyFailure(err.to_string())
    }
}

pub type InventoryResult<T> = Result<T, InventoryError>;

/// JSON error body returned by both services.
///
/// `detail` is absent for failures that are not part of the taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<InventoryError>,
}

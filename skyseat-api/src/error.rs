use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use skyseat_booking::BookingError;
use skyseat_core::{ErrorBody, InventoryError};

#[derive(Debug)]
pub enum AppError {
    Inventory(InventoryError),
    Booking(BookingError),
}

impl AppError {
    fn status(err: &InventoryError) -> StatusCode {
        match err {
            InventoryError::NotFound(_) => StatusCode::NOT_FOUND,
            InventoryError::InsufficientCapacity { .. }
            | InventoryError::SeatUnavailable(_)
            | InventoryError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            InventoryError::DependencyFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Inventory(err) | AppError::Booking(BookingError::Inventory(err)) => {
                let status = Self::status(&err);
                if status.is_server_error() {
                    tracing::error!("Dependency failure: {}", err);
                }
                (status, ErrorBody { error: err.to_string(), detail: Some(err) })
            }
            AppError::Booking(err @ BookingError::Persistence { .. }) => {
                tracing::error!("Booking persistence failed: {}", err);
                let detail = InventoryError::dependency(&err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody { error: detail.to_string(), detail: Some(detail) },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        Self::Inventory(err)
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        Self::Booking(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Inventory(InventoryError::InvalidRequest(rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::Inventory(InventoryError::InvalidRequest(rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Inventory(InventoryError::InvalidRequest(rejection.body_text()))
    }
}

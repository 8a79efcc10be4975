use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use skyseat_core::{Booking, CreateBookingRequest};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::BookingState;

pub fn routes() -> Router<BookingState> {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings/{booking_id}", get(get_booking))
}

/// POST /bookings
async fn create_booking(
    State(state): State<BookingState>,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let Json(req) = payload?;
    let booking = state.orchestrator.create_booking(req).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /bookings/{booking_id}
async fn get_booking(
    State(state): State<BookingState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Booking>, AppError> {
    let Path(booking_id) = path?;
    let booking = state.orchestrator.get_booking(booking_id).await?;
    Ok(Json(booking))
}

use std::convert::Infallible;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use serde::Serialize;
use skyseat_core::search::FlightSearchQuery;
use skyseat_core::{Flight, FlightSummary, InventoryError, NewFlight, ReserveSeatsRequest, ReserveSeatsResponse, Seat};
use tokio_stream::wrappers::BroadcastStream;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::FlightState;

#[derive(Debug, Serialize)]
pub struct SeatMapResponse {
    pub seats: Vec<Seat>,
}

#[derive(Debug, Serialize)]
pub struct SeatLabelsResponse {
    pub seats: Vec<String>,
}

pub fn routes() -> Router<FlightState> {
    Router::new()
        .route("/flights", post(create_flight))
        .route("/flights/search", get(search_flights))
        .route("/flights/{flight_id}", get(get_flight))
        .route("/flights/{flight_id}/seats", get(get_seat_map))
        .route("/flights/{flight_id}/seats/free", get(free_seats))
        .route("/flights/{flight_id}/seats/reserved", get(reserved_seats))
        .route("/flights/{flight_id}/reserve", post(reserve_seats))
        .route("/flights/{flight_id}/stream", get(stream_reservations))
}

async fn load(state: &FlightState, flight_id: Uuid) -> Result<Flight, AppError> {
    let flight = state
        .store
        .read(flight_id)
        .await
        .map_err(InventoryError::dependency)?
        .ok_or_else(|| InventoryError::NotFound(format!("flight {}", flight_id)))?;
    Ok(flight)
}

/// POST /flights
async fn create_flight(
    State(state): State<FlightState>,
    payload: Result<Json<NewFlight>, JsonRejection>,
) -> Result<Json<FlightSummary>, AppError> {
    let Json(req) = payload?;
    let flight = req.into_flight()?;

    state.store.create_flight(&flight).await.map_err(InventoryError::dependency)?;
    info!("Flight {} ({}) created with {} seats", flight.id, flight.flight_number, flight.available_seats);

    Ok(Json(FlightSummary::from(&flight)))
}

/// GET /flights/search?origin=..&destination=..&departure_date=..
async fn search_flights(
    State(state): State<FlightState>,
    query: Result<Query<FlightSearchQuery>, QueryRejection>,
) -> Result<Json<Vec<FlightSummary>>, AppError> {
    let Query(query) = query?;
    let flights = state.store.search(&query).await.map_err(InventoryError::dependency)?;
    Ok(Json(flights.iter().map(FlightSummary::from).collect()))
}

/// GET /flights/{flight_id}
async fn get_flight(
    State(state): State<FlightState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<FlightSummary>, AppError> {
    let Path(flight_id) = path?;
    let flight = load(&state, flight_id).await?;
    Ok(Json(FlightSummary::from(&flight)))
}

/// GET /flights/{flight_id}/seats
async fn get_seat_map(
    State(state): State<FlightState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<SeatMapResponse>, AppError> {
    let Path(flight_id) = path?;
    let flight = load(&state, flight_id).await?;
    Ok(Json(SeatMapResponse { seats: flight.seat_map.seats }))
}

async fn free_seats(
    State(state): State<FlightState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<SeatLabelsResponse>, AppError> {
    let Path(flight_id) = path?;
    let flight = load(&state, flight_id).await?;
    Ok(Json(SeatLabelsResponse { seats: flight.seat_map.free_labels() }))
}

async fn reserved_seats(
    State(state): State<FlightState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<SeatLabelsResponse>, AppError> {
    let Path(flight_id) = path?;
    let flight = load(&state, flight_id).await?;
    Ok(Json(SeatLabelsResponse { seats: flight.seat_map.occupied_labels() }))
}

/// POST /flights/{flight_id}/reserve
async fn reserve_seats(
    State(state): State<FlightState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ReserveSeatsRequest>, JsonRejection>,
) -> Result<Json<ReserveSeatsResponse>, AppError> {
    let Path(flight_id) = path?;
    let Json(req) = payload?;
    let seats = state.engine.reserve(flight_id, &req.seats_to_book).await?;
    Ok(Json(ReserveSeatsResponse::reserved(seats)))
}

/// GET /flights/{flight_id}/stream
///
/// Server-sent `seats_reserved` events for one flight.
async fn stream_reservations(
    State(state): State<FlightState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let Path(flight_id) = path?;
    load(&state, flight_id).await?;

    let rx = state.events_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |result| async move {
        match result {
            Ok(event) if event.flight_id == flight_id => Event::default()
                .event("seats_reserved")
                .json_data(&event)
                .ok()
                .map(Ok),
            // Lagged receivers skip what they missed.
            _ => None,
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use skyseat_core::{ErrorBody, FlightSummary, InventoryError, InventoryResult, ReserveSeatsRequest, ReserveSeatsResponse};
use tracing::warn;
use uuid::Uuid;

/// The booking service's view of the flight service.
#[async_trait]
pub trait FlightClient: Send + Sync {
    /// `None` when the flight service does not know the flight.
    async fn get_flight(&self, flight_id: Uuid) -> InventoryResult<Option<FlightSummary>>;

    /// Reserve exactly these seats; the flight service's verdict is returned as is.
    async fn reserve_seats(&self, flight_id: Uuid, seats: &[String]) -> InventoryResult<Vec<String>>;
}

pub struct HttpFlightClient {
    http: Client,
    base_url: String,
}

impl HttpFlightClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn flight_url(&self, flight_id: Uuid) -> String {
        format!("{}/flights/{}", self.base_url, flight_id)
    }
}

#[async_trait]
impl FlightClient for HttpFlightClient {
    async fn get_flight(&self, flight_id: Uuid) -> InventoryResult<Option<FlightSummary>> {
        let response = self
            .http
            .get(self.flight_url(flight_id))
            .send()
            .await
            .map_err(InventoryError::dependency)?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => response.json().await.map(Some).map_err(InventoryError::dependency),
            _ => Err(decode_error(response).await),
        }
    }

    async fn reserve_seats(&self, flight_id: Uuid, seats: &[String]) -> InventoryResult<Vec<String>> {
        let response = self
            .http
            .post(format!("{}/reserve", self.flight_url(flight_id)))
            .json(&ReserveSeatsRequest { seats_to_book: seats.to_vec() })
            .send()
            .await
            .map_err(InventoryError::dependency)?;

        if !response.status().is_success() {
            return Err(decode_error(response).await);
        }

        let body: ReserveSeatsResponse = response.json().await.map_err(InventoryError::dependency)?;
        Ok(body.seats)
    }
}

/// Recover the flight service's error kind from its response body.
async fn decode_error(response: Response) -> InventoryError {
    let status = response.status();
    let text = match response.text().await {
        Ok(t) => t,
        Err(e) => return InventoryError::dependency(e),
    };
    error_from_body(status, &text)
}

fn error_from_body(status: StatusCode, text: &str) -> InventoryError {
    match serde_json::from_str::<ErrorBody>(text) {
        Ok(ErrorBody { detail: Some(detail), .. }) => detail,
        Ok(ErrorBody { error, detail: None }) if status == StatusCode::NOT_FOUND => InventoryError::NotFound(error),
        Ok(ErrorBody { error, detail: None }) => {
            InventoryError::DependencyFailure(format!("flight service returned {}: {}", status, error))
        }
        Err(_) => {
            warn!("Unrecognised error body from flight service ({}): {}", status, text);
            InventoryError::DependencyFailure(format!("flight service returned {}", status))
        }
    }
}

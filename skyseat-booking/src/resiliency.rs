use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use skyseat_core::{FlightSummary, InventoryError, InventoryResult};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::client::FlightClient;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircuitState {
    Closed,   // Normal operation
    Open,     // Failure detected, failing fast
    HalfOpen, // Testing if service is back
}

pub struct CircuitBreaker {
    pub name: String,
    pub state: RwLock<CircuitState>,
    pub failure_count: AtomicUsize,
    pub failure_threshold: usize,
    pub reset_timeout: Duration,
    pub last_failure: RwLock<Option<Instant>>,
    // Start of the single trial call let through while Half-Open.
    trial_started: RwLock<Option<Instant>>,
}

impl CircuitBreaker {
    pub fn new(name: &str, threshold: usize, timeout: Duration) -> Self {
        Self {
            name: name.to_string(),
            state: RwLock::new(CircuitState::Closed),
            failure_count: AtomicUsize::new(0),
            failure_threshold: threshold,
            reset_timeout: timeout,
            last_failure: RwLock::new(None),
            trial_started: RwLock::new(None),
        }
    }

    pub async fn check(&self) -> bool {
        let state = *self.state.read().await;
        if state == CircuitState::Closed {
            return true;
        }

        if state == CircuitState::Open {
            let last_fail = *self.last_failure.read().await;
            let expired = matches!(last_fail, Some(instant) if instant.elapsed() > self.reset_timeout);
            if !expired {
                return false;
            }

            let mut s = self.state.write().await;
            match *s {
                CircuitState::Closed => return true,
                CircuitState::Open => {
                    *s = CircuitState::HalfOpen;
                    *self.trial_started.write().await = None;
                    tracing::info!("Circuit Breaker [{}] moving to Half-Open", self.name);
                }
                CircuitState::HalfOpen => {}
            }
        }

        self.claim_trial().await
    }

    /// Half-Open lets one call through at a time. A trial that never reports
    /// back is given up on after the reset timeout.
    async fn claim_trial(&self) -> bool {
        let mut trial = self.trial_started.write().await;
        match *trial {
            Some(started) if started.elapsed() <= self.reset_timeout => false,
            _ => {
                *trial = Some(Instant::now());
                true
            }
        }
    }

    pub async fn record_success(&self) {
        let mut state = self.state.write().await;
        if *state == CircuitState::HalfOpen {
            *state = CircuitState::Closed;
            self.failure_count.store(0, Ordering::SeqCst);
            tracing::info!("Circuit Breaker [{}] recovered to Closed", self.name);
        } else if *state == CircuitState::Closed {
            self.failure_count.store(0, Ordering::SeqCst);
        }
        *self.trial_started.write().await = None;
    }

    pub async fn record_failure(&self) {
        let count = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.write().await;

        if count >= self.failure_threshold || *state == CircuitState::HalfOpen {
            *state = CircuitState::Open;
            let mut last = self.last_failure.write().await;
            *last = Some(Instant::now());
            tracing::error!("Circuit Breaker [{}] TRIPPED to Open. Failures: {}", self.name, count);
        }
        *self.trial_started.write().await = None;
    }

    pub async fn current_state(&self) -> CircuitState {
        *self.state.read().await
    }

    /// Only infrastructure failures count against the circuit; a rejected
    /// seat is a healthy answer from the flight service.
    async fn observe<T>(&self, result: &InventoryResult<T>) {
        match result {
            Err(e) if e.is_retryable() => self.record_failure().await,
            _ => self.record_success().await,
        }
    }

    fn open_error(&self) -> InventoryError {
        InventoryError::DependencyFailure(format!("circuit breaker [{}] is open", self.name))
    }
}

/// Fails fast with `DependencyFailure` while the flight service is known to be down.
pub struct BreakerFlightClient<C> {
    inner: C,
    breaker: CircuitBreaker,
}

impl<C: FlightClient> BreakerFlightClient<C> {
    pub fn new(inner: C, breaker: CircuitBreaker) -> Self {
        Self { inner, breaker }
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }
}

#[async_trait]
impl<C: FlightClient> FlightClient for BreakerFlightClient<C> {
    async fn get_flight(&self, flight_id: Uuid) -> InventoryResult<Option<FlightSummary>> {
        if !self.breaker.check().await {
            return Err(self.breaker.open_error());
        }
        let result = self.inner.get_flight(flight_id).await;
        self.breaker.observe(&result).await;
        result
    }

    async fn reserve_seats(&self, flight_id: Uuid, seats: &[String]) -> InventoryResult<Vec<String>> {
        if !self.breaker.check().await {
            return Err(self.breaker.open_error());
        }
        let result = self.inner.reserve_seats(flight_id, seats).await;
        self.breaker.observe(&result).await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Answers every call with the configured error and counts calls.
    struct ScriptedClient {
        error: InventoryError,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FlightClient for ScriptedClient {
        async fn get_flight(&self, _flight_id: Uuid) -> InventoryResult<Option<FlightSummary>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(self.error.clone())
        }

        async fn reserve_seats(&self, _flight_id: Uuid, _seats: &[String]) -> InventoryResult<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(self.error.clone())
        }
    }

    fn client(error: InventoryError, threshold: usize, reset: Duration) -> BreakerFlightClient<ScriptedClient> {
        BreakerFlightClient::new(
            ScriptedClient { error, calls: AtomicUsize::new(0) },
            CircuitBreaker::new("flight-service", threshold, reset),
        )
    }

    #[tokio::test]
    async fn test_opens_after_threshold_and_fails_fast() {
        let c = client(InventoryError::dependency("connection refused"), 2, Duration::from_secs(60));
        let id = Uuid::new_v4();

        for _ in 0..2 {
            assert!(c.get_flight(id).await.is_err());
        }
        assert_eq!(c.breaker().current_state().await, CircuitState::Open);

        let err = c.reserve_seats(id, &["1A".to_string()]).await.unwrap_err();
        assert_eq!(err, InventoryError::DependencyFailure("circuit breaker [flight-service] is open".into()));
        assert_eq!(c.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_business_errors_do_not_trip() {
        let c = client(InventoryError::SeatUnavailable("1A".into()), 1, Duration::from_secs(60));
        let id = Uuid::new_v4();

        for _ in 0..3 {
            let err = c.reserve_seats(id, &["1A".to_string()]).await.unwrap_err();
            assert_eq!(err, InventoryError::SeatUnavailable("1A".into()));
        }
        assert_eq!(c.breaker().current_state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_half_open_after_reset_timeout() {
        let c = client(InventoryError::dependency("timeout"), 1, Duration::from_millis(10));
        let id = Uuid::new_v4();

        assert!(c.get_flight(id).await.is_err());
        assert_eq!(c.breaker().current_state().await, CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(c.breaker().check().await);
        assert_eq!(c.breaker().current_state().await, CircuitState::HalfOpen);
    }

    #[tokio::test]
    async fn test_half_open_admits_single_trial() {
        let breaker = CircuitBreaker::new("flight-service", 1, Duration::from_millis(50));
        breaker.record_failure().await;
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(breaker.check().await);
        assert!(!breaker.check().await);
        assert!(!breaker.check().await);

        breaker.record_success().await;
        assert_eq!(breaker.current_state().await, CircuitState::Closed);
        assert!(breaker.check().await);
    }

    #[tokio::test]
    async fn test_failed_trial_reopens() {
        let breaker = CircuitBreaker::new("flight-service", 3, Duration::from_millis(50));
        for _ in 0..3 {
            breaker.record_failure().await;
        }
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(breaker.check().await);
        breaker.record_failure().await;
        assert_eq!(breaker.current_state().await, CircuitState::Open);
        assert!(!breaker.check().await);
    }
}

use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub flight_server: ServerConfig,
    pub booking_server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub reservation: ReservationConfig,
    pub flight_client: FlightClientConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Without a URL both services fall back to in-memory stores.
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
        }
    }
}

fn default_max_connections() -> u32 { 5 }
fn default_acquire_timeout() -> u64 { 3 }

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ReservationConfig {
    /// Upper bound on waiting for a flight hold. Unbounded when unset.
    pub lock_timeout_ms: Option<u64>,
}

impl ReservationConfig {
    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FlightClientConfig {
    pub base_url: String,
    #[serde(default = "default_client_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_breaker_threshold")]
    pub breaker_threshold: usize,
    #[serde(default = "default_breaker_reset")]
    pub breaker_reset_secs: u64,
}

fn default_client_timeout() -> u64 { 5 }
fn default_breaker_threshold() -> usize { 5 }
fn default_breaker_reset() -> u64 { 30 }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `SKYSEAT_DATABASE__URL=postgres://...` sets `database.url`
            .add_source(config::Environment::with_prefix("SKYSEAT").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_optional_sections() {
        let s = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [flight_server]
                port = 8001

                [booking_server]
                port = 8002

                [flight_client]
                base_url = "http://localhost:8001"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let cfg: Config = s.try_deserialize().unwrap();
        assert!(cfg.database.url.is_none());
        assert_eq!(cfg.database.max_connections, 5);
        assert!(cfg.reservation.lock_timeout().is_none());
        assert_eq!(cfg.flight_client.breaker_threshold, 5);
    }

    #[test]
    fn test_lock_timeout_in_millis() {
        let r = ReservationConfig { lock_timeout_ms: Some(250) };
        assert_eq!(r.lock_timeout(), Some(Duration::from_millis(250)));
    }
}

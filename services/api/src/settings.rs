//! Service settings
//!
//! Loaded with the `config` crate from built-in defaults overridden by
//! `BOOKING__*` environment variables, e.g. `BOOKING__SERVER__PORT=8080` or
//! `BOOKING__AVAILABILITY__CACHE_TTL_SECONDS=30`. Credentials and connection
//! strings are not here; each component reads its own from the environment.

use std::time::Duration;

use anyhow::Result;
use booking::{AvailabilityConfig, FallbackConfig};
use config::{Config, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub availability: AvailabilitySettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Availability tuning, see [`AvailabilityConfig`]
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilitySettings {
    pub cache_ttl_seconds: u64,
    pub fallback_currency: String,
    pub fallback_rooms: u32,
    pub fallback_base_rate: f64,
    pub fallback_per_guest_rate: f64,
}

impl From<&AvailabilitySettings> for AvailabilityConfig {
    fn from(settings: &AvailabilitySettings) -> Self {
        AvailabilityConfig {
            cache_ttl: Duration::from_secs(settings.cache_ttl_seconds),
            fallback: FallbackConfig {
                currency: settings.fallback_currency.clone(),
                rooms_available: settings.fallback_rooms,
                base_rate: settings.fallback_base_rate,
                per_guest_rate: settings.fallback_per_guest_rate,
            },
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let defaults = AvailabilityConfig::default();

        let settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3001)?
            .set_default(
                "availability.cache_ttl_seconds",
                defaults.cache_ttl.as_secs(),
            )?
            .set_default("availability.fallback_currency", defaults.fallback.currency)?
            .set_default(
                "availability.fallback_rooms",
                defaults.fallback.rooms_available,
            )?
            .set_default("availability.fallback_base_rate", defaults.fallback.base_rate)?
            .set_default(
                "availability.fallback_per_guest_rate",
                defaults.fallback.per_guest_rate,
            )?
            .add_source(
                Environment::with_prefix("BOOKING")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

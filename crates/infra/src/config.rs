//! Configuration loading and representation.

use thiserror::Error;

pub const DATABASE_URL_VAR: &str = "TOOLCRIB_DATABASE_URL";
pub const FORECAST_WINDOW_VAR: &str = "TOOLCRIB_FORECAST_WINDOW_DAYS";

const DEFAULT_DATABASE_URL: &str = "sqlite://toolcrib.db";
const DEFAULT_FORECAST_WINDOW_DAYS: u32 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Runtime settings for a warehouse session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseConfig {
    /// sqlx SQLite URL of the record store.
    pub database_url: String,
    /// History window used by the demand forecast.
    pub forecast_window_days: u32,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            forecast_window_days: DEFAULT_FORECAST_WINDOW_DAYS,
        }
    }
}

impl WarehouseConfig {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup(DATABASE_URL_VAR).unwrap_or_else(|| {
            tracing::warn!(
                "{DATABASE_URL_VAR} not set; using {DEFAULT_DATABASE_URL}"
            );
            DEFAULT_DATABASE_URL.to_string()
        });

        let forecast_window_days = match lookup(FORECAST_WINDOW_VAR) {
            None => DEFAULT_FORECAST_WINDOW_DAYS,
            Some(raw) => raw.trim().parse::<u32>().map_err(|_| ConfigError::InvalidValue {
                key: FORECAST_WINDOW_VAR,
                value: raw.clone(),
                reason: "expected a non-negative whole number of days",
            })?,
        };

        Ok(Self {
            database_url,
            forecast_window_days,
        })
    }
}

//! Runtime configuration read from the environment (and `.env`).

use crate::sdk::routing::{FallbackProvider, LocalOrsProvider, RemoteOrsProvider, RoutingError};
use crate::sdk::routing::service::RoutingProvider;
use crate::sdk::util::rate_limit::{limiter_per_minute, ORS_REQUESTS_PER_MINUTE};
use serde::Serialize;
use std::{env, str::FromStr, sync::Arc};
use thiserror::Error;

pub const DEFAULT_LOCAL_URL: &str = "http://localhost:8080/ors";
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },

    #[error("unknown ORS_MODE '{0}' (expected remote, local or fallback)")]
    UnknownMode(String),
}

/// Which openrouteservice deployment answers directions requests.
#[derive(Debug, Clone, PartialEq)]
pub enum OrsConfig {
    Remote { api_key: String },
    Local { base_url: String },
    /// Self-hosted first, public API when it fails.
    Fallback { api_key: String, base_url: String },
}

/// Fuel model applied to every route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostModel {
    pub consumption_l_per_100km: f64,
    pub fuel_price_eur_per_l: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            consumption_l_per_100km: 9.5,
            fuel_price_eur_per_l: 1.75,
        }
    }
}

impl CostModel {
    pub fn fuel_for(&self, distance_km: f64) -> f64 {
        distance_km * self.consumption_l_per_100km / 100.0
    }

    pub fn cost_for(&self, fuel_l: f64) -> f64 {
        fuel_l * self.fuel_price_eur_per_l
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub ors: OrsConfig,
    pub requests_per_minute: u32,
    pub max_concurrent: usize,
    pub cost: CostModel,
}

impl PlannerConfig {
    /// Reads the process environment after loading `.env`, if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let local_url = || get("ORS_LOCAL_URL").unwrap_or_else(|| DEFAULT_LOCAL_URL.to_string());
        let api_key = || get("ORS_API_KEY").ok_or(ConfigError::Missing("ORS_API_KEY"));

        let mode = get("ORS_MODE").unwrap_or_else(|| "remote".to_string());
        let ors = match mode.trim().to_ascii_lowercase().as_str() {
            "remote" => OrsConfig::Remote { api_key: api_key()? },
            "local" => OrsConfig::Local {
                base_url: local_url(),
            },
            "fallback" => OrsConfig::Fallback {
                api_key: api_key()?,
                base_url: local_url(),
            },
            _ => return Err(ConfigError::UnknownMode(mode)),
        };

        let defaults = CostModel::default();
        Ok(Self {
            ors,
            requests_per_minute: parse_or(
                get("ORS_REQUESTS_PER_MINUTE"),
                "ORS_REQUESTS_PER_MINUTE",
                ORS_REQUESTS_PER_MINUTE,
            )?,
            max_concurrent: parse_or(
                get("EBDUE_MAX_CONCURRENT"),
                "EBDUE_MAX_CONCURRENT",
                DEFAULT_MAX_CONCURRENT,
            )?
            .max(1),
            cost: CostModel {
                consumption_l_per_100km: parse_or(
                    get("EBDUE_FUEL_CONSUMPTION"),
                    "EBDUE_FUEL_CONSUMPTION",
                    defaults.consumption_l_per_100km,
                )?,
                fuel_price_eur_per_l: parse_or(
                    get("EBDUE_FUEL_PRICE"),
                    "EBDUE_FUEL_PRICE",
                    defaults.fuel_price_eur_per_l,
                )?,
            },
        })
    }

    /// Builds the provider stack selected by `ORS_MODE`.
    pub fn routing_provider(&self) -> Result<Arc<dyn RoutingProvider>, RoutingError> {
        let provider: Arc<dyn RoutingProvider> = match &self.ors {
            OrsConfig::Remote { api_key } => Arc::new(RemoteOrsProvider::new(
                api_key.clone(),
                limiter_per_minute(self.requests_per_minute),
            )?),
            OrsConfig::Local { base_url } => Arc::new(LocalOrsProvider::new(base_url.clone())?),
            OrsConfig::Fallback { api_key, base_url } => Arc::new(FallbackProvider::new(
                Arc::new(LocalOrsProvider::new(base_url.clone())?),
                Arc::new(RemoteOrsProvider::new(
                    api_key.clone(),
                    limiter_per_minute(self.requests_per_minute),
                )?),
            )),
        };
        log::info!("Using routing provider '{}'", provider.name());
        Ok(provider)
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

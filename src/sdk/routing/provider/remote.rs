use super::read_directions;
use super::types::DirectionsRequest;
use crate::sdk::model::Coordinates;
use crate::sdk::routing::error::RoutingError;
use crate::sdk::routing::route::RouteSummary;
use crate::sdk::routing::service::{RoutingProvider, DEFAULT_PROFILE};
use crate::sdk::util::rate_limit::Limiter;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const ORS_PUBLIC_URL: &str = "https://api.openrouteservice.org";

/// Public openrouteservice API, authenticated by key and rate limited.
pub struct RemoteOrsProvider {
    client: Client,
    api_key: String,
    base_url: String,
    profile: String,
    limiter: Limiter,
}

impl RemoteOrsProvider {
    pub fn new(api_key: String, limiter: Limiter) -> Result<Self, RoutingError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(15)).build()?,
            api_key,
            base_url: ORS_PUBLIC_URL.to_string(),
            profile: DEFAULT_PROFILE.to_string(),
            limiter,
        })
    }

    /// Points the provider at another ORS-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }
}

#[async_trait]
impl RoutingProvider for RemoteOrsProvider {
    fn name(&self) -> &str {
        "ors-remote"
    }

    fn profile(&self) -> &str {
        &self.profile
    }

    async fn route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<RouteSummary, RoutingError> {
        if origin == destination {
            return Ok(RouteSummary::zero());
        }

        self.limiter.until_ready().await;
        log::debug!(
            "[PROVIDER] Calling remote directions for {} -> {}",
            origin,
            destination
        );
        let url = format!("{}/v2/directions/{}", self.base_url, self.profile);
        let body = DirectionsRequest::between(origin, destination);

        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                log::error!("Failed to send POST request. URL: {}\nError: {}", url, e);
                e
            })?;

        read_directions(response, &url).await
    }
}

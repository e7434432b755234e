use super::read_directions;
use super::types::DirectionsRequest;
use crate::sdk::model::Coordinates;
use crate::sdk::routing::error::RoutingError;
use crate::sdk::routing::route::RouteSummary;
use crate::sdk::routing::service::{RoutingProvider, DEFAULT_PROFILE};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Self-hosted ORS instance. No key, no rate limit.
pub struct LocalOrsProvider {
    client: Client,
    base_url: String,
}

impl LocalOrsProvider {
    pub fn new(base_url: String) -> Result<Self, RoutingError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(15)).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RoutingProvider for LocalOrsProvider {
    fn name(&self) -> &str {
        "ors-local"
    }

    async fn route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<RouteSummary, RoutingError> {
        if origin == destination {
            return Ok(RouteSummary::zero());
        }

        log::debug!(
            "[PROVIDER] Calling local directions for {} -> {}",
            origin,
            destination
        );
        let url = format!("{}/v2/directions/{}", self.base_url, DEFAULT_PROFILE);
        let body = DirectionsRequest::between(origin, destination);

        let response = match self.client.post(&url).json(&body).send().await {
            Ok(resp) => resp,
            Err(e) => {
                log::error!(
                    "Failed to send POST request to local ORS. URL: {}\nError: {}",
                    url,
                    e
                );
                return Err(e.into());
            }
        };

        read_directions(response, &url).await
    }
}

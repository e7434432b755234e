use crate::sdk::model::{Coordinates, StartAddress, StartAddressError};
use crate::sdk::util::rate_limit::Limiter;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Confidence reported for an exact geocoding match.
pub const MATCH_ACCURACY: u8 = 95;

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeMatch {
    pub coordinates: Coordinates,
    pub display_name: String,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<GeocodeMatch, StartAddressError>;
}

// Nominatim returns coordinates as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

/// Forward geocoding through a Nominatim instance, restricted to Germany.
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
    limiter: Limiter,
}

impl NominatimGeocoder {
    pub fn new(limiter: Limiter) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .user_agent("eb-due/1.0")
                .build()?,
            base_url: NOMINATIM_URL.to_string(),
            limiter,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn search(&self, query: &str) -> Result<Vec<Place>, reqwest::Error> {
        self.limiter.until_ready().await;
        log::debug!("[GEOCODE] Searching Nominatim for \"{}\"", query);
        self.client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("q", query),
                ("format", "json"),
                ("limit", "1"),
                ("countrycodes", "de"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<GeocodeMatch, StartAddressError> {
        let failed = |reason: String| StartAddressError::GeocodingFailed {
            query: query.to_string(),
            reason,
        };

        let places = self.search(query).await.map_err(|e| {
            log::error!("Geocoding request failed for \"{}\": {}", query, e);
            failed(e.to_string())
        })?;
        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| StartAddressError::NoMatch(query.to_string()))?;

        let lat = place.lat.parse::<f64>();
        let lng = place.lon.parse::<f64>();
        match (lat, lng) {
            (Ok(lat), Ok(lng)) => Ok(GeocodeMatch {
                coordinates: Coordinates::new(lat, lng),
                display_name: place.display_name,
            }),
            _ => Err(failed(format!(
                "invalid coordinates '{}', '{}'",
                place.lat, place.lon
            ))),
        }
    }
}

/// Geocodes free-text input into a [`StartAddress`].
///
/// A failed lookup is an error; there is no approximate fallback position.
pub async fn resolve_start_address(
    geocoder: &dyn Geocoder,
    input: &str,
) -> Result<StartAddress, StartAddressError> {
    let query = input.trim();
    if query.is_empty() {
        return Err(StartAddressError::Empty);
    }
    let found = geocoder.geocode(query).await?;
    log::info!("Start address \"{}\" -> {}", query, found.display_name);
    StartAddress::from_input(query, found.coordinates, MATCH_ACCURACY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::util::rate_limit::limiter_per_minute;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn geocoder(server: &MockServer) -> NominatimGeocoder {
        NominatimGeocoder::new(limiter_per_minute(600))
            .unwrap()
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn resolves_start_address_from_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Taubenheimstraße 85, Stuttgart, 70372"))
            .and(query_param("countrycodes", "de"))
            .and(header("User-Agent", "eb-due/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "lat": "48.8046", "lon": "9.2163",
                "display_name": "85, Taubenheimstraße, Bad Cannstatt, Stuttgart"
            }])))
            .mount(&server)
            .await;

        let start = resolve_start_address(&geocoder(&server), "Taubenheimstraße 85, Stuttgart, 70372")
            .await
            .unwrap();
        assert_eq!(start.coordinates, Coordinates::new(48.8046, 9.2163));
        assert_eq!(start.city, "Stuttgart");
        assert_eq!(start.accuracy, MATCH_ACCURACY);
    }

    #[tokio::test]
    async fn empty_result_is_no_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let err = resolve_start_address(&geocoder(&server), "Nirgendwo 1")
            .await
            .unwrap_err();
        assert!(matches!(err, StartAddressError::NoMatch(_)));
    }

    #[tokio::test]
    async fn server_error_is_a_hard_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = resolve_start_address(&geocoder(&server), "Königstraße 1, Stuttgart")
            .await
            .unwrap_err();
        assert!(matches!(err, StartAddressError::GeocodingFailed { .. }));
    }

    #[tokio::test]
    async fn blank_input_is_rejected_before_lookup() {
        let server = MockServer::start().await;
        let err = resolve_start_address(&geocoder(&server), "  ").await.unwrap_err();
        assert!(matches!(err, StartAddressError::Empty));
    }
}

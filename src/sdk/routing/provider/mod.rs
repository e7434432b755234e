pub mod fallback;
pub mod local;
pub mod remote;
pub mod types;

pub use fallback::FallbackProvider;
pub use local::LocalOrsProvider;
pub use remote::RemoteOrsProvider;

use super::error::{OrsErrorPayload, RoutingError};
use super::route::RouteSummary;
use reqwest::Response;
use types::DirectionsResponse;

/// Turns an ORS directions response into a summary, shared by the remote and
/// self-hosted providers.
pub(crate) async fn read_directions(
    response: Response,
    url: &str,
) -> Result<RouteSummary, RoutingError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        // Try to parse the structured error first
        if let Ok(payload) = serde_json::from_str::<OrsErrorPayload>(&text) {
            return Err(RoutingError::from_payload(payload));
        }
        log::error!(
            "API returned non-success status: {}. Unparseable Body: {}",
            status,
            text
        );
        return Err(RoutingError::RawApiError {
            status: status.as_u16(),
            body: text,
        });
    }

    let route_response: DirectionsResponse = serde_json::from_str(&text).map_err(|e| {
        log::error!(
            "Failed to parse DirectionsResponse. URL: {}\nError: {}. Body: {}",
            url,
            e,
            text
        );
        e
    })?;

    match route_response.routes.first() {
        Some(route) => Ok(RouteSummary::from_ors(
            route.summary.distance,
            route.summary.duration,
        )),
        None => match serde_json::from_str::<OrsErrorPayload>(&text) {
            Ok(payload) => Err(RoutingError::from_payload(payload)),
            Err(_) => Err(RoutingError::NoRoute),
        },
    }
}

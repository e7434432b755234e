use super::error::RoutingError;
use super::route::RouteSummary;
use crate::sdk::model::Coordinates;
use async_trait::async_trait;

pub const DEFAULT_PROFILE: &str = "driving-car";

#[async_trait]
pub trait RoutingProvider: Send + Sync {
    /// Short label used in logs and export metadata.
    fn name(&self) -> &str;

    /// Routing profile label stored on every result.
    fn profile(&self) -> &str {
        DEFAULT_PROFILE
    }

    /// Gets directions between two points.
    async fn route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<RouteSummary, RoutingError>;
}

use crate::sdk::model::Coordinates;
use crate::sdk::routing::error::RoutingError;
use crate::sdk::routing::route::RouteSummary;
use crate::sdk::routing::service::RoutingProvider;
use async_trait::async_trait;
use std::sync::Arc;

/// Tries `primary` first and falls back to `secondary` when it fails.
///
/// Usually the self-hosted instance is primary and the public API secondary,
/// so the API quota is only spent when the local instance is down.
pub struct FallbackProvider {
    primary: Arc<dyn RoutingProvider>,
    secondary: Arc<dyn RoutingProvider>,
    name: String,
}

impl FallbackProvider {
    pub fn new(primary: Arc<dyn RoutingProvider>, secondary: Arc<dyn RoutingProvider>) -> Self {
        let name = format!("{}+{}", primary.name(), secondary.name());
        Self {
            primary,
            secondary,
            name,
        }
    }
}

#[async_trait]
impl RoutingProvider for FallbackProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn profile(&self) -> &str {
        self.primary.profile()
    }

    async fn route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<RouteSummary, RoutingError> {
        match self.primary.route(origin, destination).await {
            Ok(summary) => Ok(summary),
            Err(err) => {
                log::warn!(
                    "[Fallback Provider] {} failed ({}), using {}",
                    self.primary.name(),
                    err,
                    self.secondary.name()
                );
                self.secondary.route(origin, destination).await
            }
        }
    }
}

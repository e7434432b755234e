pub mod cache;
pub mod error;
pub mod geocode;
pub mod provider;
pub mod route;
pub mod service;

pub use cache::{CachingProvider, CoordPairKey, RouteCache};
pub use error::RoutingError;
pub use geocode::{resolve_start_address, Geocoder, NominatimGeocoder};
pub use provider::{FallbackProvider, LocalOrsProvider, RemoteOrsProvider};
pub use route::RouteSummary;
pub use service::RoutingProvider;

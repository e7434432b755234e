pub mod sdk;

pub use sdk::aggregate::{AggregationError, AggregationReport, Aggregator, DestinationFailure};
pub use sdk::catalog::{Catalog, CatalogError, CatalogStore, CustomAddress, Station, StationType};
pub use sdk::config::{CostModel, OrsConfig, PlannerConfig};
pub use sdk::export::{export, ExportError, ExportFormat, ExportMetadata};
pub use sdk::model::{
    Coordinates, DestinationDescriptor, DestinationKind, RouteResult, StartAddress,
    StartAddressError,
};
pub use sdk::projection::{clipboard_text, summary, table, AggregateSummary, TableRow};
pub use sdk::routing::{RouteSummary, RoutingError, RoutingProvider};
pub use sdk::selection::{resolve, Resolution, Selection};
pub use sdk::session::{recompute, RouteSet, RouteView, SharedSession, WizardSession};

use crate::sdk::model::Coordinates;
use serde::{Deserialize, Serialize};

// --- Data Structures for ORS directions requests and responses ---

#[derive(Serialize)]
pub struct DirectionsRequest {
    pub coordinates: [[f64; 2]; 2],
}

impl DirectionsRequest {
    pub fn between(origin: Coordinates, destination: Coordinates) -> Self {
        Self {
            coordinates: [origin.lon_lat(), destination.lon_lat()],
        }
    }
}

#[derive(Deserialize)]
pub struct DirectionsResponse {
    #[serde(default)]
    pub routes: Vec<Route>,
}
#[derive(Deserialize)]
pub struct Route {
    #[serde(default)]
    pub summary: DirectionsSummary,
}
// ORS omits both fields for zero-length routes.
#[derive(Deserialize, Clone, Copy, Default)]
pub struct DirectionsSummary {
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub duration: f64,
}

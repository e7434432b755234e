#![allow(dead_code)]

use async_trait::async_trait;
use ebdue_rust::sdk::catalog::{Catalog, CustomAddress, ReviewStatus, Station, StationType};
use ebdue_rust::sdk::model::{Coordinates, StartAddress};
use ebdue_rust::sdk::routing::{RouteSummary, RoutingError, RoutingProvider};
use std::sync::Mutex;
use std::time::Duration;

pub const STUTTGART: Coordinates = Coordinates { lat: 48.7758, lng: 9.1829 };
pub const KARLSRUHE: Coordinates = Coordinates { lat: 49.0069, lng: 8.4037 };
pub const FREUDENSTADT: Coordinates = Coordinates { lat: 48.4875, lng: 8.4660 };
pub const MANNHEIM: Coordinates = Coordinates { lat: 49.4875, lng: 8.4660 };
pub const DEPOT: Coordinates = Coordinates { lat: 48.6, lng: 9.0 };

struct Entry {
    at: Coordinates,
    outcome: Option<RouteSummary>,
    delay: Duration,
}

/// Answers from a fixed table keyed by destination. Unknown destinations and
/// entries without an outcome fail as unroutable.
#[derive(Default)]
pub struct StubProvider {
    entries: Vec<Entry>,
    calls: Mutex<Vec<Coordinates>>,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route_to(mut self, at: Coordinates, km: f64, min: f64, delay_ms: u64) -> Self {
        self.entries.push(Entry {
            at,
            outcome: Some(RouteSummary {
                distance_km: km,
                duration_min: min,
            }),
            delay: Duration::from_millis(delay_ms),
        });
        self
    }

    pub fn fail_to(mut self, at: Coordinates, delay_ms: u64) -> Self {
        self.entries.push(Entry {
            at,
            outcome: None,
            delay: Duration::from_millis(delay_ms),
        });
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RoutingProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn route(&self, _: Coordinates, to: Coordinates) -> Result<RouteSummary, RoutingError> {
        self.calls.lock().unwrap().push(to);
        let entry = self.entries.iter().find(|e| e.at == to);
        if let Some(entry) = entry {
            tokio::time::sleep(entry.delay).await;
        }
        entry
            .and_then(|e| e.outcome)
            .ok_or(RoutingError::UnroutablePoint)
    }
}

pub fn start() -> StartAddress {
    StartAddress::from_input("Taubenheimstraße 85, Stuttgart, 70372", STUTTGART, 95).unwrap()
}

pub fn station(id: &str, name: &str, at: Coordinates, station_type: StationType) -> Station {
    Station {
        id: id.to_string(),
        name: name.to_string(),
        address: format!("{name}, Baden-Württemberg"),
        coordinates: Some(at),
        station_type,
        parent_id: None,
        city: String::new(),
        phone: None,
        emergency_24h: true,
    }
}

pub fn catalog() -> Catalog {
    let mut mannheim = station("rev-ma", "Revier Mannheim-Innenstadt", MANNHEIM, StationType::Revier);
    mannheim.parent_id = Some("pp-ka".into());
    Catalog::new(
        vec![
            station("pp-ka", "Polizeipräsidium Karlsruhe", KARLSRUHE, StationType::Praesidium),
            station("rev-fds", "Revier Freudenstadt", FREUDENSTADT, StationType::Revier),
            mannheim,
        ],
        vec![CustomAddress {
            id: "addr-depot".into(),
            name: "Fahrzeugdepot".into(),
            street: "Hafenstraße 3".into(),
            zip_code: "70327".into(),
            city: "Stuttgart".into(),
            coordinates: Some(DEPOT),
            is_verified: true,
            review_status: ReviewStatus::Approved,
        }],
    )
}

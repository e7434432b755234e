//! Concurrent per-destination routing with ordered fan-in.

use crate::sdk::config::{CostModel, DEFAULT_MAX_CONCURRENT};
use crate::sdk::model::{DestinationDescriptor, RouteResult, StartAddress};
use crate::sdk::routing::{RouteSummary, RoutingError, RoutingProvider};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Map colours, assigned by the destination's position in the request.
pub const ROUTE_COLORS: [&str; 10] = [
    "#2563eb", "#dc2626", "#16a34a", "#d97706", "#7c3aed", "#0891b2", "#db2777", "#65a30d",
    "#ea580c", "#4f46e5",
];

pub fn route_color(index: usize) -> &'static str {
    ROUTE_COLORS[index % ROUTE_COLORS.len()]
}

/// A destination that could not be routed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DestinationFailure {
    pub index: usize,
    pub id: String,
    pub name: String,
    pub reason: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregationError {
    #[error("no destinations selected")]
    NothingSelected,

    #[error("routing failed for all {} destinations", .failures.len())]
    TotalRoutingFailure { failures: Vec<DestinationFailure> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationReport {
    /// Successful routes in destination order.
    pub results: Vec<RouteResult>,
    pub failures: Vec<DestinationFailure>,
    pub provider: String,
}

impl AggregationReport {
    pub fn partial_failures(&self) -> usize {
        self.failures.len()
    }
}

pub struct Aggregator {
    provider: Arc<dyn RoutingProvider>,
    cost: CostModel,
    max_concurrent: usize,
}

impl Aggregator {
    pub fn new(provider: Arc<dyn RoutingProvider>, cost: CostModel) -> Self {
        Self {
            provider,
            cost,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    /// Caps in-flight routing requests; zero is treated as one.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn cost_model(&self) -> CostModel {
        self.cost
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Routes from `start` to every destination and returns the successes in
    /// input order. Individual failures are reported, not fatal.
    pub async fn run(
        &self,
        start: &StartAddress,
        destinations: &[DestinationDescriptor],
    ) -> Result<AggregationReport, AggregationError> {
        if destinations.is_empty() {
            return Err(AggregationError::NothingSelected);
        }

        let origin = start.coordinates;
        let provider = &self.provider;
        log::info!(
            "Routing {} destinations from \"{}\" via {}",
            destinations.len(),
            start.full_address,
            provider.name()
        );

        let completed: Vec<(usize, Result<RouteSummary, RoutingError>)> =
            stream::iter(destinations.iter().enumerate())
                .map(|(index, destination)| async move {
                    (index, provider.route(origin, destination.coordinates).await)
                })
                .buffer_unordered(self.max_concurrent)
                .collect()
                .await;

        // Completion order is arbitrary; put every outcome back in its slot.
        let mut slots: Vec<Option<Result<RouteSummary, RoutingError>>> =
            destinations.iter().map(|_| None).collect();
        for (index, outcome) in completed {
            slots[index] = Some(outcome);
        }

        let mut results = Vec::with_capacity(destinations.len());
        let mut failures = Vec::new();
        for (index, (destination, slot)) in destinations.iter().zip(slots).enumerate() {
            match slot {
                Some(Ok(summary)) => results.push(self.to_result(index, destination, summary)),
                Some(Err(err)) => {
                    log::warn!("Route to \"{}\" failed: {}", destination.name, err);
                    failures.push(DestinationFailure {
                        index,
                        id: destination.id.clone(),
                        name: destination.name.clone(),
                        reason: err.to_string(),
                    });
                }
                None => failures.push(DestinationFailure {
                    index,
                    id: destination.id.clone(),
                    name: destination.name.clone(),
                    reason: "route request did not complete".to_string(),
                }),
            }
        }

        if results.is_empty() {
            log::error!("Routing failed for all {} destinations", failures.len());
            return Err(AggregationError::TotalRoutingFailure { failures });
        }

        log::info!(
            "Computed {} routes ({} failed)",
            results.len(),
            failures.len()
        );
        Ok(AggregationReport {
            results,
            failures,
            provider: provider.name().to_string(),
        })
    }

    fn to_result(
        &self,
        index: usize,
        destination: &DestinationDescriptor,
        summary: RouteSummary,
    ) -> RouteResult {
        let fuel = self.cost.fuel_for(summary.distance_km);
        RouteResult {
            id: destination.id.clone(),
            destination_name: destination.name.clone(),
            destination_type: destination.kind,
            address: destination.address.clone(),
            distance_km: summary.distance_km,
            duration_min: summary.duration_min,
            estimated_fuel_l: fuel,
            estimated_cost_eur: self.cost.cost_for(fuel),
            route_type: self.provider.profile().to_string(),
            color: route_color(index).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::model::{Coordinates, DestinationKind};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Routes keyed by destination latitude; unknown latitudes fail.
    struct Table {
        routes: HashMap<u64, (RouteSummary, u64)>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl Table {
        fn new(entries: &[(f64, f64, f64, u64)]) -> Arc<Self> {
            Arc::new(Self {
                routes: entries
                    .iter()
                    .map(|&(lat, km, min, delay)| {
                        (lat.to_bits(), (RouteSummary { distance_km: km, duration_min: min }, delay))
                    })
                    .collect(),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RoutingProvider for Table {
        fn name(&self) -> &str {
            "table"
        }

        async fn route(&self, _: Coordinates, to: Coordinates) -> Result<RouteSummary, RoutingError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            let entry = self.routes.get(&to.lat.to_bits()).copied();
            if let Some((_, delay)) = entry {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            entry
                .map(|(summary, _)| summary)
                .ok_or(RoutingError::UnroutablePoint)
        }
    }

    fn start() -> StartAddress {
        StartAddress::from_input("Schlossplatz 1, Stuttgart", Coordinates::new(48.7758, 9.1829), 95).unwrap()
    }

    fn destination(id: &str, lat: f64) -> DestinationDescriptor {
        DestinationDescriptor {
            id: id.to_string(),
            name: format!("Station {id}"),
            address: format!("{id}-Straße 1"),
            coordinates: Coordinates::new(lat, 8.5),
            kind: DestinationKind::Station,
        }
    }

    #[tokio::test]
    async fn keeps_input_order_when_completion_is_reversed() {
        let provider = Table::new(&[(1.0, 10.0, 10.0, 60), (2.0, 20.0, 20.0, 30), (3.0, 30.0, 30.0, 0)]);
        let aggregator = Aggregator::new(provider, CostModel::default());
        let destinations = [destination("a", 1.0), destination("b", 2.0), destination("c", 3.0)];

        let report = aggregator.run(&start(), &destinations).await.unwrap();
        let ids: Vec<_> = report.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(report.partial_failures(), 0);
        assert_eq!(report.provider, "table");
    }

    #[tokio::test]
    async fn failures_are_dropped_and_reported() {
        let provider = Table::new(&[(1.0, 70.0, 60.0, 0), (3.0, 5.0, 8.0, 0)]);
        let aggregator = Aggregator::new(provider, CostModel::default());
        let destinations = [destination("x", 1.0), destination("y", 2.0), destination("z", 3.0)];

        let report = aggregator.run(&start(), &destinations).await.unwrap();
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, "y");
        assert_eq!(report.failures[0].index, 1);

        // Colours follow the input index, so z keeps its colour despite y failing.
        assert_eq!(report.results[0].color, ROUTE_COLORS[0]);
        assert_eq!(report.results[1].color, ROUTE_COLORS[2]);
    }

    #[tokio::test]
    async fn derives_fuel_cost_and_profile() {
        let provider = Table::new(&[(1.0, 70.0, 60.0, 0)]);
        let aggregator = Aggregator::new(provider, CostModel::default());

        let report = aggregator.run(&start(), &[destination("x", 1.0)]).await.unwrap();
        let result = &report.results[0];
        assert_eq!(result.distance_km, 70.0);
        assert!((result.estimated_fuel_l - 6.65).abs() < 1e-9);
        assert!((result.estimated_cost_eur - 11.6375).abs() < 1e-9);
        assert_eq!(result.route_type, "driving-car");
        assert_eq!(result.destination_type, DestinationKind::Station);
    }

    #[tokio::test]
    async fn all_failed_and_empty_input_are_distinct() {
        let aggregator = Aggregator::new(Table::new(&[]), CostModel::default());

        let err = aggregator.run(&start(), &[destination("y", 2.0)]).await.unwrap_err();
        match err {
            AggregationError::TotalRoutingFailure { failures } => assert_eq!(failures.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            aggregator.run(&start(), &[]).await.unwrap_err(),
            AggregationError::NothingSelected
        );
    }

    #[tokio::test]
    async fn concurrency_is_bounded() {
        let entries: Vec<_> = (1..=8).map(|i| (i as f64, 1.0, 1.0, 20)).collect();
        let provider = Table::new(&entries);
        let aggregator = Aggregator::new(provider.clone(), CostModel::default()).with_max_concurrent(3);
        let destinations: Vec<_> = (1..=8).map(|i| destination(&i.to_string(), i as f64)).collect();

        let report = aggregator.run(&start(), &destinations).await.unwrap();
        assert_eq!(report.results.len(), 8);
        assert!(provider.peak.load(Ordering::SeqCst) <= 3);
    }
}

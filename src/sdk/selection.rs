//! Turns the user's selection into an ordered list of routable destinations.

use crate::sdk::catalog::Catalog;
use crate::sdk::model::{DestinationDescriptor, DestinationKind, StartAddress};
use std::collections::BTreeSet;

/// Selected station and custom-address ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    stations: BTreeSet<String>,
    addresses: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_station(&mut self, id: impl Into<String>) {
        self.stations.insert(id.into());
    }

    pub fn deselect_station(&mut self, id: &str) {
        self.stations.remove(id);
    }

    /// Returns whether the station is selected afterwards.
    pub fn toggle_station(&mut self, id: &str) -> bool {
        if self.stations.remove(id) {
            false
        } else {
            self.stations.insert(id.to_string());
            true
        }
    }

    pub fn select_address(&mut self, id: impl Into<String>) {
        self.addresses.insert(id.into());
    }

    pub fn deselect_address(&mut self, id: &str) {
        self.addresses.remove(id);
    }

    pub fn toggle_address(&mut self, id: &str) -> bool {
        if self.addresses.remove(id) {
            false
        } else {
            self.addresses.insert(id.to_string());
            true
        }
    }

    /// Selects a headquarters together with all of its precincts.
    /// Returns the number of stations added; unknown ids add nothing.
    pub fn select_praesidium_with_reviere(&mut self, catalog: &Catalog, praesidium_id: &str) -> usize {
        let Some(praesidium) = catalog.praesidium(praesidium_id) else {
            log::debug!("No headquarters with id '{}'", praesidium_id);
            return 0;
        };
        let before = self.stations.len();
        self.stations.insert(praesidium.id.clone());
        for revier in catalog.reviere_of(praesidium_id) {
            self.stations.insert(revier.id.clone());
        }
        self.stations.len() - before
    }

    pub fn contains_station(&self, id: &str) -> bool {
        self.stations.contains(id)
    }

    pub fn contains_address(&self, id: &str) -> bool {
        self.addresses.contains(id)
    }

    pub fn len(&self) -> usize {
        self.stations.len() + self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty() && self.addresses.is_empty()
    }

    pub fn clear(&mut self) {
        self.stations.clear();
        self.addresses.clear();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// No start address, or nothing routable selected. Aggregation must not run.
    NothingSelected,
    Ready(Vec<DestinationDescriptor>),
}

/// Resolves a selection against the catalog snapshot.
///
/// Stations come first in catalog order, then custom addresses in catalog
/// order. Ids missing from the catalog are skipped, as are custom addresses
/// that have no coordinates yet.
pub fn resolve(
    start: Option<&StartAddress>,
    selection: &Selection,
    catalog: &Catalog,
) -> Resolution {
    if start.is_none() || selection.is_empty() {
        return Resolution::NothingSelected;
    }

    let mut descriptors = Vec::with_capacity(selection.len());

    for station in catalog.stations.iter().filter(|s| selection.contains_station(&s.id)) {
        match station.coordinates {
            Some(coordinates) => descriptors.push(DestinationDescriptor {
                id: station.id.clone(),
                name: station.name.clone(),
                address: station.address.clone(),
                coordinates,
                kind: DestinationKind::Station,
            }),
            None => log::warn!("Station '{}' has no coordinates, skipping", station.name),
        }
    }

    for address in catalog.addresses.iter().filter(|a| selection.contains_address(&a.id)) {
        match address.coordinates {
            Some(coordinates) => descriptors.push(DestinationDescriptor {
                id: address.id.clone(),
                name: address.name.clone(),
                address: address.full_address(),
                coordinates,
                kind: DestinationKind::Custom,
            }),
            None => log::warn!("Custom address '{}' has no coordinates, skipping", address.name),
        }
    }

    let unknown = selection.len().saturating_sub(descriptors.len());
    if unknown > 0 {
        log::debug!("{} selected ids did not resolve to a routable destination", unknown);
    }

    if descriptors.is_empty() {
        Resolution::NothingSelected
    } else {
        Resolution::Ready(descriptors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::catalog::tests::{address, station};
    use crate::sdk::catalog::StationType;
    use crate::sdk::model::Coordinates;

    fn start() -> StartAddress {
        StartAddress::from_input("Taubenheimstraße 85, Stuttgart, 70372", Coordinates::new(48.7758, 9.1829), 95)
            .unwrap()
    }

    fn catalog() -> Catalog {
        let mut hq = station("pp-ka", "Polizeipräsidium Karlsruhe", 49.0069, 8.4037);
        hq.station_type = StationType::Praesidium;
        let mut rev = station("rev-ka", "Revier Karlsruhe-Marktplatz", 49.0094, 8.4037);
        rev.parent_id = Some("pp-ka".into());
        Catalog::new(
            vec![
                station("pp-s", "Polizeipräsidium Stuttgart", 48.7758, 9.1829),
                hq,
                rev,
            ],
            vec![
                address("a1", "Depot", Some(Coordinates::new(48.5, 9.0))),
                address("a2", "Unverified", None),
            ],
        )
    }

    fn ids(resolution: &Resolution) -> Vec<&str> {
        match resolution {
            Resolution::Ready(d) => d.iter().map(|d| d.id.as_str()).collect(),
            Resolution::NothingSelected => vec![],
        }
    }

    #[test]
    fn stations_first_in_catalog_order_then_addresses() {
        let mut selection = Selection::new();
        selection.select_address("a1");
        selection.select_station("rev-ka");
        selection.select_station("pp-s");

        let resolution = resolve(Some(&start()), &selection, &catalog());
        assert_eq!(ids(&resolution), vec!["pp-s", "rev-ka", "a1"]);

        let Resolution::Ready(descriptors) = resolution else {
            panic!("expected destinations");
        };
        assert_eq!(descriptors[2].kind, DestinationKind::Custom);
        assert_eq!(descriptors[2].address, "Königstraße 1, 70173 Stuttgart");
    }

    #[test]
    fn unknown_and_unlocated_entries_are_dropped() {
        let mut selection = Selection::new();
        selection.select_station("gone");
        selection.select_address("a2");
        selection.select_address("a1");

        assert_eq!(ids(&resolve(Some(&start()), &selection, &catalog())), vec!["a1"]);
    }

    #[test]
    fn nothing_selected_cases() {
        let catalog = catalog();
        let mut selection = Selection::new();
        assert_eq!(resolve(Some(&start()), &selection, &catalog), Resolution::NothingSelected);

        selection.select_station("pp-s");
        assert_eq!(resolve(None, &selection, &catalog), Resolution::NothingSelected);

        selection.clear();
        selection.select_address("a2");
        assert_eq!(resolve(Some(&start()), &selection, &catalog), Resolution::NothingSelected);
    }

    #[test]
    fn toggling_and_counting() {
        let mut selection = Selection::new();
        assert!(selection.toggle_station("pp-s"));
        assert!(selection.toggle_address("a1"));
        assert_eq!(selection.len(), 2);
        assert!(!selection.toggle_station("pp-s"));
        selection.deselect_address("a1");
        assert!(selection.is_empty());
    }

    #[test]
    fn praesidium_pulls_in_its_reviere() {
        let catalog = catalog();
        let mut selection = Selection::new();
        assert_eq!(selection.select_praesidium_with_reviere(&catalog, "pp-ka"), 2);
        assert!(selection.contains_station("rev-ka"));
        assert_eq!(selection.select_praesidium_with_reviere(&catalog, "rev-ka"), 0);
    }
}

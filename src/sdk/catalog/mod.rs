//! Station and custom-address catalogs.
//!
//! A [`Catalog`] is a read-only snapshot handed to selection resolution. It can
//! be loaded from disk, from a stations CSV, or refreshed from a
//! [`CatalogStore`]. A failed refresh keeps the previous snapshot.

mod error;
mod import;
mod store;

pub use import::load_stations_csv;
pub use error::CatalogError;
pub use store::{CatalogStore, HttpCatalogStore, MemoryCatalogStore};

use crate::sdk::model::Coordinates;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationType {
    /// Regional headquarters.
    Praesidium,
    /// Precinct, usually attached to a headquarters via `parent_id`.
    #[default]
    Revier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(rename = "type", default)]
    pub station_type: StationType,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default, alias = "telefon")]
    pub phone: Option<String>,
    #[serde(rename = "emergency24h", alias = "notdienst24h", default)]
    pub emergency_24h: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomAddress {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub review_status: ReviewStatus,
}

impl CustomAddress {
    /// Single-line postal address, e.g. `"Königstraße 1, 70173 Stuttgart"`.
    pub fn full_address(&self) -> String {
        let locality = [self.zip_code.as_str(), self.city.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        match (self.street.is_empty(), locality.is_empty()) {
            (false, false) => format!("{}, {}", self.street, locality),
            (false, true) => self.street.clone(),
            (true, _) => locality,
        }
    }
}

/// Records coming from the backend must carry an id and a name.
pub(crate) trait CatalogRecord {
    fn record_id(&self) -> &str;
    fn record_name(&self) -> &str;
}

impl CatalogRecord for Station {
    fn record_id(&self) -> &str {
        &self.id
    }
    fn record_name(&self) -> &str {
        &self.name
    }
}

impl CatalogRecord for CustomAddress {
    fn record_id(&self) -> &str {
        &self.id
    }
    fn record_name(&self) -> &str {
        &self.name
    }
}

pub(crate) fn retain_valid<T: CatalogRecord>(records: Vec<T>, kind: &str) -> Vec<T> {
    let total = records.len();
    let valid: Vec<T> = records
        .into_iter()
        .filter(|r| !r.record_id().trim().is_empty() && !r.record_name().trim().is_empty())
        .collect();
    if valid.len() != total {
        log::warn!("Dropped {} invalid {} records", total - valid.len(), kind);
    }
    valid
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub stations: Vec<Station>,
    #[serde(default)]
    pub addresses: Vec<CustomAddress>,
}

impl Catalog {
    pub fn new(stations: Vec<Station>, addresses: Vec<CustomAddress>) -> Self {
        Self {
            stations,
            addresses,
        }
    }

    /// Loads a snapshot written by [`Catalog::save_to_file`]. A missing file
    /// yields an empty catalog.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        if !path.as_ref().exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)?;
        let catalog: Catalog = serde_json::from_str(&data)?;
        Ok(Self {
            stations: retain_valid(catalog.stations, "station"),
            addresses: retain_valid(catalog.addresses, "address"),
        })
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CatalogError> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Replaces stations and addresses with the store's current listing.
    ///
    /// Each list is replaced only if it was fetched successfully; on failure
    /// the cached list stays in place and the first error is returned.
    pub async fn refresh(&mut self, store: &dyn CatalogStore) -> Result<(), CatalogError> {
        let mut first_error = None;

        match store.list_stations().await {
            Ok(stations) => {
                log::info!("Loaded {} stations from catalog store", stations.len());
                self.stations = stations;
            }
            Err(err) => {
                log::warn!(
                    "Station catalog unavailable, keeping {} cached stations: {}",
                    self.stations.len(),
                    err
                );
                first_error.get_or_insert(err);
            }
        }

        match store.list_addresses().await {
            Ok(addresses) => {
                log::info!("Loaded {} custom addresses from catalog store", addresses.len());
                self.addresses = addresses;
            }
            Err(err) => {
                log::warn!(
                    "Address catalog unavailable, keeping {} cached addresses: {}",
                    self.addresses.len(),
                    err
                );
                first_error.get_or_insert(err);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    pub fn station(&self, id: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.id == id)
    }

    pub fn address(&self, id: &str) -> Option<&CustomAddress> {
        self.addresses.iter().find(|a| a.id == id)
    }

    pub fn stations_by_type(&self, station_type: StationType) -> Vec<&Station> {
        self.stations
            .iter()
            .filter(|s| s.station_type == station_type)
            .collect()
    }

    /// Looks up a headquarters by id; precinct ids yield `None`.
    pub fn praesidium(&self, id: &str) -> Option<&Station> {
        self.stations
            .iter()
            .find(|s| s.id == id && s.station_type == StationType::Praesidium)
    }

    /// Precincts attached to the given headquarters, in catalog order.
    pub fn reviere_of(&self, praesidium_id: &str) -> Vec<&Station> {
        self.stations
            .iter()
            .filter(|s| s.parent_id.as_deref() == Some(praesidium_id))
            .collect()
    }
}

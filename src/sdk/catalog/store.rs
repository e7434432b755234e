use super::{retain_valid, Catalog, CatalogError, CustomAddress, Station};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// Remote persistence for stations and custom addresses.
///
/// `create_*` ignores the id of the record passed in; the store assigns one.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_stations(&self) -> Result<Vec<Station>, CatalogError>;
    async fn create_station(&self, station: &Station) -> Result<Station, CatalogError>;
    async fn update_station(&self, id: &str, station: &Station) -> Result<Station, CatalogError>;
    async fn delete_station(&self, id: &str) -> Result<(), CatalogError>;

    async fn list_addresses(&self) -> Result<Vec<CustomAddress>, CatalogError>;
    async fn create_address(&self, address: &CustomAddress) -> Result<CustomAddress, CatalogError>;
    async fn update_address(
        &self,
        id: &str,
        address: &CustomAddress,
    ) -> Result<CustomAddress, CatalogError>;
    async fn delete_address(&self, id: &str) -> Result<(), CatalogError>;
}

// The backend answers either with a bare array or wraps it. Records are kept
// as raw JSON so one malformed entry does not sink the listing.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing {
    Wrapped {
        #[serde(alias = "addresses")]
        stations: Vec<Value>,
    },
    Bare(Vec<Value>),
}

impl Listing {
    fn into_records<T: DeserializeOwned>(self, kind: &str) -> Vec<T> {
        let raw = match self {
            Listing::Wrapped { stations } => stations,
            Listing::Bare(records) => records,
        };
        raw.into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("Skipping malformed {} record: {}", kind, e);
                    None
                }
            })
            .collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Single<T> {
    Wrapped {
        #[serde(alias = "address")]
        station: T,
    },
    Bare(T),
}

impl<T> Single<T> {
    fn into_inner(self) -> T {
        match self {
            Single::Wrapped { station } => station,
            Single::Bare(record) => record,
        }
    }
}

/// [`CatalogStore`] backed by the `/api/stationen` and `/api/addresses` endpoints.
pub struct HttpCatalogStore {
    client: Client,
    base_url: String,
}

impl HttpCatalogStore {
    pub fn new(base_url: impl Into<String>) -> Result<Self, CatalogError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(5)).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, CatalogError> {
        let response = request.header("Accept", "application/json").send().await?;
        let status = response.status();
        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("text/html"));
        let text = response.text().await?;

        if is_html || looks_like_html(&text) {
            log::warn!("Catalog service at {} returned HTML", self.base_url);
            return Err(CatalogError::NotJson);
        }
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<(), CatalogError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

fn looks_like_html(body: &str) -> bool {
    let head = body.trim_start().get(..64).unwrap_or(body.trim_start());
    let head = head.to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}

#[async_trait]
impl CatalogStore for HttpCatalogStore {
    async fn list_stations(&self) -> Result<Vec<Station>, CatalogError> {
        log::debug!("[CATALOG] GET stations from {}", self.base_url);
        let listing: Listing = self.send(self.client.get(self.url("/api/stationen"))).await?;
        Ok(retain_valid(listing.into_records("station"), "station"))
    }

    async fn create_station(&self, station: &Station) -> Result<Station, CatalogError> {
        let request = self.client.post(self.url("/api/stationen")).json(station);
        let created: Single<Station> = self.send(request).await?;
        Ok(created.into_inner())
    }

    // The stations endpoint takes the id in the body rather than the path.
    async fn update_station(&self, id: &str, station: &Station) -> Result<Station, CatalogError> {
        let mut body = station.clone();
        body.id = id.to_string();
        let request = self.client.put(self.url("/api/stationen")).json(&body);
        let updated: Single<Station> = self.send(request).await?;
        Ok(updated.into_inner())
    }

    async fn delete_station(&self, id: &str) -> Result<(), CatalogError> {
        let request = self.client.delete(self.url(&format!("/api/stationen/{}", id)));
        self.send_empty(request).await
    }

    async fn list_addresses(&self) -> Result<Vec<CustomAddress>, CatalogError> {
        log::debug!("[CATALOG] GET addresses from {}", self.base_url);
        let listing: Listing = self.send(self.client.get(self.url("/api/addresses"))).await?;
        Ok(retain_valid(listing.into_records("address"), "address"))
    }

    async fn create_address(&self, address: &CustomAddress) -> Result<CustomAddress, CatalogError> {
        let request = self.client.post(self.url("/api/addresses")).json(address);
        let created: Single<CustomAddress> = self.send(request).await?;
        Ok(created.into_inner())
    }

    async fn update_address(
        &self,
        id: &str,
        address: &CustomAddress,
    ) -> Result<CustomAddress, CatalogError> {
        let request = self
            .client
            .put(self.url(&format!("/api/addresses/{}", id)))
            .json(address);
        let updated: Single<CustomAddress> = self.send(request).await?;
        Ok(updated.into_inner())
    }

    async fn delete_address(&self, id: &str) -> Result<(), CatalogError> {
        let request = self.client.delete(self.url(&format!("/api/addresses/{}", id)));
        self.send_empty(request).await
    }
}

/// In-process [`CatalogStore`], used offline and in tests.
pub struct MemoryCatalogStore {
    catalog: Mutex<Catalog>,
    next_id: AtomicU64,
}

impl Default for MemoryCatalogStore {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}

impl MemoryCatalogStore {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Mutex::new(catalog),
            next_id: AtomicU64::new(1),
        }
    }

    pub async fn snapshot(&self) -> Catalog {
        self.catalog.lock().await.clone()
    }

    fn generate_id(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn list_stations(&self) -> Result<Vec<Station>, CatalogError> {
        Ok(self.catalog.lock().await.stations.clone())
    }

    async fn create_station(&self, station: &Station) -> Result<Station, CatalogError> {
        let mut created = station.clone();
        created.id = self.generate_id("station");
        self.catalog.lock().await.stations.push(created.clone());
        Ok(created)
    }

    async fn update_station(&self, id: &str, station: &Station) -> Result<Station, CatalogError> {
        let mut catalog = self.catalog.lock().await;
        let slot = catalog
            .stations
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        *slot = Station {
            id: id.to_string(),
            ..station.clone()
        };
        Ok(slot.clone())
    }

    async fn delete_station(&self, id: &str) -> Result<(), CatalogError> {
        let mut catalog = self.catalog.lock().await;
        let before = catalog.stations.len();
        catalog.stations.retain(|s| s.id != id);
        if catalog.stations.len() == before {
            return Err(CatalogError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn list_addresses(&self) -> Result<Vec<CustomAddress>, CatalogError> {
        Ok(self.catalog.lock().await.addresses.clone())
    }

    async fn create_address(&self, address: &CustomAddress) -> Result<CustomAddress, CatalogError> {
        let mut created = address.clone();
        created.id = self.generate_id("address");
        self.catalog.lock().await.addresses.push(created.clone());
        Ok(created)
    }

    async fn update_address(
        &self,
        id: &str,
        address: &CustomAddress,
    ) -> Result<CustomAddress, CatalogError> {
        let mut catalog = self.catalog.lock().await;
        let slot = catalog
            .addresses
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        *slot = CustomAddress {
            id: id.to_string(),
            ..address.clone()
        };
        Ok(slot.clone())
    }

    async fn delete_address(&self, id: &str) -> Result<(), CatalogError> {
        let mut catalog = self.catalog.lock().await;
        let before = catalog.addresses.len();
        catalog.addresses.retain(|a| a.id != id);
        if catalog.addresses.len() == before {
            return Err(CatalogError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

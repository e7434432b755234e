use super::error::RoutingError;
use super::route::RouteSummary;
use super::service::RoutingProvider;
use crate::sdk::model::Coordinates;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap, fmt, fs, io::Result as IoResult, path::Path, str::FromStr, sync::Arc,
};

/// Directional cache key. Positions are rounded to six decimals (about 10 cm).
#[derive(Serialize, Deserialize, Eq, PartialEq, Hash, Clone, Debug)]
pub struct CoordPairKey {
    pub origin: String,
    pub destination: String,
}

impl CoordPairKey {
    pub fn new(origin: Coordinates, destination: Coordinates) -> Self {
        Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
        }
    }
}

impl fmt::Display for CoordPairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.origin, self.destination)
    }
}

impl FromStr for CoordPairKey {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once("::") {
            Some((origin, destination)) if !origin.is_empty() && !destination.is_empty() => {
                Ok(CoordPairKey {
                    origin: origin.to_string(),
                    destination: destination.to_string(),
                })
            }
            _ => Err("Invalid CoordPairKey format"),
        }
    }
}

// --- Serde Helper for Complex Key ---
mod coord_pair_map {
    use super::{CoordPairKey, RouteSummary};
    use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};
    use std::{collections::HashMap, str::FromStr};

    pub fn serialize<S: Serializer>(
        map: &HashMap<CoordPairKey, RouteSummary>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let string_map: HashMap<String, &RouteSummary> =
            map.iter().map(|(k, v)| (k.to_string(), v)).collect();
        string_map.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HashMap<CoordPairKey, RouteSummary>, D::Error> {
        let string_map = HashMap::<String, RouteSummary>::deserialize(deserializer)?;
        string_map
            .into_iter()
            .map(|(k, v)| Ok((CoordPairKey::from_str(&k).map_err(Error::custom)?, v)))
            .collect()
    }
}

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct RouteCache {
    #[serde(with = "coord_pair_map")]
    routes: HashMap<CoordPairKey, RouteSummary>,
}

impl RouteCache {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        if path.as_ref().exists() {
            let data = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> IoResult<()> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)
    }

    pub fn get_route(&self, key: &CoordPairKey) -> Option<RouteSummary> {
        self.routes.get(key).copied()
    }

    pub fn insert_route(&mut self, key: CoordPairKey, summary: RouteSummary) {
        self.routes.insert(key, summary);
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Wraps a provider and remembers successful routes. Failures are not cached.
pub struct CachingProvider {
    inner: Arc<dyn RoutingProvider>,
    cache: Mutex<RouteCache>,
}

impl CachingProvider {
    pub fn new(inner: Arc<dyn RoutingProvider>, cache: RouteCache) -> Self {
        Self {
            inner,
            cache: Mutex::new(cache),
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> IoResult<()> {
        self.cache.lock().save_to_file(path)
    }

    pub fn cached_routes(&self) -> usize {
        self.cache.lock().len()
    }
}

#[async_trait]
impl RoutingProvider for CachingProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn profile(&self) -> &str {
        self.inner.profile()
    }

    async fn route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<RouteSummary, RoutingError> {
        let key = CoordPairKey::new(origin, destination);

        // The guard must be gone before the await below.
        let hit = self.cache.lock().get_route(&key);
        if let Some(summary) = hit {
            log::debug!("[CACHE HIT] {}", key);
            return Ok(summary);
        }

        let summary = self.inner.route(origin, destination).await?;
        self.cache.lock().insert_route(key, summary);
        Ok(summary)
    }
}

use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

/// A WGS84 position. Serialized as `{ "lat": .., "lng": .. }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Longitude first, as expected by openrouteservice.
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

// The catalog backend hands coordinates out as an object, a `[lat, lng]` pair,
// or the JSON text of either one.
impl<'de> Deserialize<'de> for Coordinates {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Object { lat: f64, lng: f64 },
            Pair([f64; 2]),
            Encoded(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Object { lat, lng } => Ok(Coordinates { lat, lng }),
            Repr::Pair([lat, lng]) => Ok(Coordinates { lat, lng }),
            Repr::Encoded(text) => serde_json::from_str(&text).map_err(de::Error::custom),
        }
    }
}

#[derive(Error, Debug)]
pub enum StartAddressError {
    #[error("start address is empty")]
    Empty,

    #[error("no geocoding match for '{0}'")]
    NoMatch(String),

    #[error("geocoding failed for '{query}': {reason}")]
    GeocodingFailed { query: String, reason: String },
}

/// Origin of every route in a wizard session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAddress {
    pub street: String,
    pub house_number: String,
    pub zip_code: String,
    pub city: String,
    pub full_address: String,
    pub coordinates: Coordinates,
    /// Confidence of the position in percent.
    pub accuracy: u8,
}

impl StartAddress {
    /// Builds a start address from free text of the form
    /// `"Street 12, City, Zip"` and an already known position.
    pub fn from_input(
        input: &str,
        coordinates: Coordinates,
        accuracy: u8,
    ) -> Result<Self, StartAddressError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(StartAddressError::Empty);
        }

        let mut parts = input.split(',').map(str::trim);
        let street_part = parts.next().unwrap_or_default();
        let city = parts.next().unwrap_or_default().to_string();
        let zip_code = parts.next().unwrap_or_default().to_string();
        let (street, house_number) = split_house_number(street_part);

        Ok(Self {
            street,
            house_number,
            zip_code,
            city,
            full_address: input.to_string(),
            coordinates,
            accuracy: accuracy.min(100),
        })
    }
}

fn split_house_number(street: &str) -> (String, String) {
    match street.rsplit_once(' ') {
        Some((name, number)) if number.starts_with(|c: char| c.is_ascii_digit()) => {
            (name.trim().to_string(), number.to_string())
        }
        _ => (street.to_string(), String::new()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationKind {
    Station,
    Custom,
}

impl DestinationKind {
    pub fn label(&self) -> &'static str {
        match self {
            DestinationKind::Station => "Police station",
            DestinationKind::Custom => "Custom address",
        }
    }
}

/// A routable destination produced by selection resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct DestinationDescriptor {
    pub id: String,
    pub name: String,
    pub address: String,
    pub coordinates: Coordinates,
    pub kind: DestinationKind,
}

/// Metrics of one computed route from the start address to one destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    pub id: String,
    pub destination_name: String,
    pub destination_type: DestinationKind,
    pub address: String,
    pub distance_km: f64,
    pub duration_min: f64,
    pub estimated_fuel_l: f64,
    pub estimated_cost_eur: f64,
    pub route_type: String,
    pub color: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_accept_object_pair_and_encoded_forms() {
        let object: Coordinates = serde_json::from_str(r#"{"lat":48.7758,"lng":9.1829}"#).unwrap();
        let pair: Coordinates = serde_json::from_str("[48.7758, 9.1829]").unwrap();
        let encoded: Coordinates =
            serde_json::from_str(r#""{\"lat\":48.7758,\"lng\":9.1829}""#).unwrap();

        let expected = Coordinates::new(48.7758, 9.1829);
        assert_eq!(object, expected);
        assert_eq!(pair, expected);
        assert_eq!(encoded, expected);
    }

    #[test]
    fn coordinates_reject_garbage() {
        assert!(serde_json::from_str::<Coordinates>(r#""not json""#).is_err());
        assert!(serde_json::from_str::<Coordinates>("[1.0]").is_err());
    }

    #[test]
    fn start_address_splits_street_city_and_zip() {
        let start = StartAddress::from_input(
            " Taubenheimstraße 85, Stuttgart, 70372 ",
            Coordinates::new(48.8, 9.2),
            95,
        )
        .unwrap();

        assert_eq!(start.street, "Taubenheimstraße");
        assert_eq!(start.house_number, "85");
        assert_eq!(start.city, "Stuttgart");
        assert_eq!(start.zip_code, "70372");
        assert_eq!(start.full_address, "Taubenheimstraße 85, Stuttgart, 70372");
    }

    #[test]
    fn start_address_without_number_or_city() {
        let start = StartAddress::from_input("Schlossplatz", Coordinates::new(48.7, 9.1), 150).unwrap();
        assert_eq!(start.street, "Schlossplatz");
        assert!(start.house_number.is_empty());
        assert!(start.city.is_empty());
        assert_eq!(start.accuracy, 100);
    }

    #[test]
    fn empty_start_address_is_rejected() {
        let err = StartAddress::from_input("   ", Coordinates::new(0.0, 0.0), 50).unwrap_err();
        assert!(matches!(err, StartAddressError::Empty));
    }

    #[test]
    fn route_result_serializes_camel_case() {
        let result = RouteResult {
            id: "static-2".into(),
            destination_name: "Polizeipräsidium Karlsruhe".into(),
            destination_type: DestinationKind::Station,
            address: "Erbprinzenstraße 96, 76133 Karlsruhe".into(),
            distance_km: 70.0,
            duration_min: 60.0,
            estimated_fuel_l: 6.65,
            estimated_cost_eur: 11.6375,
            route_type: "driving-car".into(),
            color: "#2563eb".into(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["destinationName"], "Polizeipräsidium Karlsruhe");
        assert_eq!(json["destinationType"], "station");
        assert_eq!(json["distanceKm"], 70.0);
    }
}

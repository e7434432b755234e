use super::{retain_valid, CatalogError, Station, StationType};
use crate::sdk::model::Coordinates;
use csv::{ReaderBuilder, StringRecord};
use std::{fs::File, path::Path};

/// Reads stations from a CSV file with the columns
/// `id, name, address, lat, lng, type, parent_id`.
///
/// The header row is required. `type` is `praesidium` or `revier`; an empty
/// `parent_id` means the station has no headquarters.
pub fn load_stations_csv<P: AsRef<Path>>(csv_path: P) -> Result<Vec<Station>, CatalogError> {
    let file = File::open(csv_path)?;
    let mut rdr = ReaderBuilder::new()
        .delimiter(b',')
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut stations = Vec::new();
    for result in rdr.records() {
        let record = result?;
        stations.push(parse_row(&record)?);
    }

    Ok(retain_valid(stations, "station"))
}

fn parse_row(record: &StringRecord) -> Result<Station, CatalogError> {
    let line = record.position().map_or(0, |p| p.line());
    let field = |index: usize, name: &str| {
        record
            .get(index)
            .ok_or_else(|| CatalogError::MalformedRow {
                line,
                reason: format!("missing column '{}'", name),
            })
    };
    let number = |index: usize, name: &str| -> Result<f64, CatalogError> {
        let raw = field(index, name)?;
        raw.parse::<f64>().map_err(|_| CatalogError::MalformedRow {
            line,
            reason: format!("'{}' is not a number in column '{}'", raw, name),
        })
    };

    let station_type = match field(5, "type")?.to_ascii_lowercase().as_str() {
        "praesidium" => StationType::Praesidium,
        "revier" | "" => StationType::Revier,
        other => {
            return Err(CatalogError::MalformedRow {
                line,
                reason: format!("unknown station type '{}'", other),
            })
        }
    };
    let parent_id = record
        .get(6)
        .filter(|p| !p.is_empty())
        .map(str::to_string);

    Ok(Station {
        id: field(0, "id")?.to_string(),
        name: field(1, "name")?.to_string(),
        address: field(2, "address")?.to_string(),
        coordinates: Some(Coordinates::new(number(3, "lat")?, number(4, "lng")?)),
        station_type,
        parent_id,
        city: String::new(),
        phone: None,
        emergency_24h: false,
    })
}

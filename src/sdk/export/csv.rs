use super::{ExportError, ExportMetadata};
use crate::sdk::model::RouteResult;
use crate::sdk::projection::{summary, TABLE_HEADERS};
use ::csv::WriterBuilder;

/// One row per route with unrounded numbers, followed by the formatted totals
/// and the export metadata as `label,value` rows.
pub(super) fn render(results: &[RouteResult], metadata: &ExportMetadata) -> Result<Vec<u8>, ExportError> {
    let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());

    writer.write_record(TABLE_HEADERS)?;
    for r in results {
        let distance = r.distance_km.to_string();
        let duration = r.duration_min.to_string();
        let fuel = r.estimated_fuel_l.to_string();
        let cost = r.estimated_cost_eur.to_string();
        writer.write_record([
            r.destination_name.as_str(),
            r.destination_type.label(),
            r.address.as_str(),
            distance.as_str(),
            duration.as_str(),
            fuel.as_str(),
            cost.as_str(),
            r.route_type.as_str(),
        ])?;
    }

    for (label, value) in summary(results).lines() {
        writer.write_record([label, value.as_str()])?;
    }
    if metadata.failed_destinations > 0 {
        writer.write_record(["Not routable", metadata.failed_destinations.to_string().as_str()])?;
    }
    for (label, value) in metadata.lines() {
        writer.write_record([label, value.as_str()])?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}

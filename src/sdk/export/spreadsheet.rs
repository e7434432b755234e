use super::{ExportError, ExportMetadata, REPORT_TITLE};
use crate::sdk::model::RouteResult;
use crate::sdk::projection::{summary, table, TABLE_HEADERS};
use chrono::{Datelike, Timelike};
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, Workbook, Worksheet};

const COLUMN_WIDTHS: [f64; 8] = [35.0, 16.0, 40.0, 15.0, 15.0, 12.0, 12.0, 15.0];
const TABLE_FIRST_ROW: u32 = 5;

/// Two sheets: `Routes` with the table and totals, `Metadata` with the
/// export parameters.
pub(super) fn render(results: &[RouteResult], metadata: &ExportMetadata) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();

    // Pin the document timestamp so equal input yields equal bytes.
    let at = metadata.exported_at;
    let created = ExcelDateTime::from_ymd(at.year() as u16, at.month() as u8, at.day() as u8)?
        .and_hms(at.hour() as u16, at.minute() as u8, at.second())?;
    let properties = DocProperties::new()
        .set_title("Police route analysis")
        .set_creation_datetime(&created);
    workbook.set_properties(&properties);

    let bold = Format::new().set_bold();
    let one_decimal = Format::new().set_num_format("0.0");
    let whole = Format::new().set_num_format("0");

    let routes = workbook.add_worksheet();
    routes.set_name("Routes")?;
    write_routes(routes, results, metadata, &bold, &one_decimal, &whole)?;

    let meta = workbook.add_worksheet();
    meta.set_name("Metadata")?;
    write_metadata(meta, results.len(), metadata, &bold)?;

    Ok(workbook.save_to_buffer()?)
}

fn write_routes(
    sheet: &mut Worksheet,
    results: &[RouteResult],
    metadata: &ExportMetadata,
    bold: &Format,
    one_decimal: &Format,
    whole: &Format,
) -> Result<(), ExportError> {
    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }

    sheet.write_string_with_format(0, 0, REPORT_TITLE, bold)?;
    if let Some(start) = &metadata.start_address {
        sheet.write_string(1, 0, format!("Start: {}", start))?;
    }
    sheet.write_string(2, 0, format!("Exported: {}", metadata.exported_at_label()))?;

    let header_row = TABLE_FIRST_ROW - 1;
    for (col, header) in TABLE_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(header_row, col as u16, *header, bold)?;
    }

    let mut row = TABLE_FIRST_ROW;
    for entry in table(results) {
        let r = entry.result;
        sheet.write_string(row, 0, entry.name())?;
        sheet.write_string(row, 1, entry.type_label())?;
        sheet.write_string(row, 2, entry.address())?;
        sheet.write_number_with_format(row, 3, r.distance_km, one_decimal)?;
        sheet.write_number_with_format(row, 4, r.duration_min, whole)?;
        sheet.write_number_with_format(row, 5, r.estimated_fuel_l, one_decimal)?;
        sheet.write_number_with_format(row, 6, r.estimated_cost_eur, one_decimal)?;
        sheet.write_string(row, 7, entry.route_type())?;
        row += 1;
    }

    row += 1;
    sheet.write_string_with_format(row, 0, "SUMMARY", bold)?;
    for (label, value) in summary(results).lines() {
        row += 1;
        sheet.write_string(row, 0, label)?;
        sheet.write_string(row, 1, value)?;
    }
    if metadata.failed_destinations > 0 {
        row += 1;
        sheet.write_string(row, 0, "Not routable")?;
        sheet.write_number(row, 1, metadata.failed_destinations as f64)?;
    }

    Ok(())
}

fn write_metadata(
    sheet: &mut Worksheet,
    route_count: usize,
    metadata: &ExportMetadata,
    bold: &Format,
) -> Result<(), ExportError> {
    sheet.set_column_width(0, 22)?;
    sheet.set_column_width(1, 40)?;

    let mut rows = metadata.lines().to_vec();
    rows.push(("Routes", route_count.to_string()));
    rows.push(("Not routable", metadata.failed_destinations.to_string()));

    sheet.write_string_with_format(0, 0, "METADATA", bold)?;
    for (offset, (label, value)) in rows.iter().enumerate() {
        let row = offset as u32 + 2;
        sheet.write_string_with_format(row, 0, *label, bold)?;
        sheet.write_string(row, 1, value)?;
    }
    Ok(())
}

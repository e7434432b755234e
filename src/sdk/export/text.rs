use super::{ExportMetadata, REPORT_TITLE};
use crate::sdk::model::RouteResult;
use crate::sdk::projection::{summary, table};
use std::fmt::Write;

pub(super) fn render(results: &[RouteResult], metadata: &ExportMetadata) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, results, metadata);
    out
}

fn write_report(
    out: &mut String,
    results: &[RouteResult],
    metadata: &ExportMetadata,
) -> std::fmt::Result {
    writeln!(out, "{}", REPORT_TITLE)?;
    writeln!(out, "{}", "=".repeat(REPORT_TITLE.len()))?;
    if let Some(start) = &metadata.start_address {
        writeln!(out, "Start: {}", start)?;
    }
    writeln!(out)?;

    for row in table(results) {
        writeln!(
            out,
            "{}. {} | {} | {} | {} km | {} min | {} L | {} EUR",
            row.position + 1,
            row.name(),
            row.type_label(),
            row.address(),
            row.distance(),
            row.duration(),
            row.fuel(),
            row.cost()
        )?;
    }

    writeln!(out)?;
    writeln!(out, "SUMMARY")?;
    for (label, value) in summary(results).lines() {
        writeln!(out, "{}: {}", label, value)?;
    }
    if metadata.failed_destinations > 0 {
        writeln!(out, "Not routable: {}", metadata.failed_destinations)?;
    }

    writeln!(out)?;
    for (label, value) in metadata.lines() {
        writeln!(out, "{}: {}", label, value)?;
    }
    Ok(())
}

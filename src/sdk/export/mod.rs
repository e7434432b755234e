//! Serialises route results into downloadable files.
//!
//! All formats read the same results and print the totals from
//! [`projection::summary`](crate::sdk::projection::summary), so the numbers
//! match across formats.

mod csv;
mod spreadsheet;
mod text;

use crate::sdk::config::CostModel;
use crate::sdk::model::RouteResult;
use crate::sdk::session::RouteSet;
use chrono::{Local, NaiveDate, NaiveDateTime};
use std::{fmt, str::FromStr};
use thiserror::Error;

pub const REPORT_TITLE: &str = "POLICE ROUTE ANALYSIS";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to build spreadsheet: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("Export I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown export format '{0}' (expected xlsx, csv or txt)")]
pub struct UnknownFormat(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Spreadsheet,
    Csv,
    PlainText,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Spreadsheet => "xlsx",
            ExportFormat::Csv => "csv",
            ExportFormat::PlainText => "txt",
        }
    }

    /// Default download name, e.g. `Police_Routes_2024-05-17.xlsx`.
    pub fn file_name(&self, date: NaiveDate) -> String {
        format!("Police_Routes_{}.{}", date.format("%Y-%m-%d"), self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" | "excel" | "spreadsheet" => Ok(ExportFormat::Spreadsheet),
            "csv" => Ok(ExportFormat::Csv),
            "txt" | "text" | "plain" => Ok(ExportFormat::PlainText),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Header information printed alongside the results.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportMetadata {
    pub application: String,
    pub exported_at: NaiveDateTime,
    pub start_address: Option<String>,
    pub provider: String,
    pub cost: CostModel,
    pub failed_destinations: usize,
}

impl ExportMetadata {
    pub fn new(provider: impl Into<String>, cost: CostModel) -> Self {
        Self {
            application: format!("ebdue-rust v{}", env!("CARGO_PKG_VERSION")),
            exported_at: Local::now().naive_local(),
            start_address: None,
            provider: provider.into(),
            cost,
            failed_destinations: 0,
        }
    }

    pub fn for_route_set(routes: &RouteSet, cost: CostModel) -> Self {
        Self {
            start_address: Some(routes.start.full_address.clone()),
            failed_destinations: routes.partial_failures(),
            ..Self::new(routes.provider.clone(), cost)
        }
    }

    pub(crate) fn exported_at_label(&self) -> String {
        self.exported_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// The fixed header every format prints, as `(label, value)` pairs.
    pub fn lines(&self) -> [(&'static str, String); 6] {
        [
            ("Application", self.application.clone()),
            ("Exported", self.exported_at_label()),
            ("Start address", self.start_address.clone().unwrap_or_default()),
            ("Routing provider", self.provider.clone()),
            ("Fuel price", format!("{:.2} EUR/L", self.cost.fuel_price_eur_per_l)),
            ("Consumption", format!("{:.1} L/100km", self.cost.consumption_l_per_100km)),
        ]
    }
}

/// Renders `results` in the requested format. Deterministic for equal input.
pub fn export(
    results: &[RouteResult],
    format: ExportFormat,
    metadata: &ExportMetadata,
) -> Result<Vec<u8>, ExportError> {
    let bytes = match format {
        ExportFormat::Spreadsheet => spreadsheet::render(results, metadata)?,
        ExportFormat::Csv => csv::render(results, metadata)?,
        ExportFormat::PlainText => text::render(results, metadata).into_bytes(),
    };
    log::debug!(
        "Exported {} routes as {} ({} bytes)",
        results.len(),
        format,
        bytes.len()
    );
    Ok(bytes)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sdk::projection::tests::result;

    pub(crate) fn metadata() -> ExportMetadata {
        ExportMetadata {
            application: "ebdue-rust test".into(),
            exported_at: NaiveDate::from_ymd_opt(2024, 5, 17)
                .and_then(|d| d.and_hms_opt(14, 30, 0))
                .unwrap(),
            start_address: Some("Taubenheimstraße 85, Stuttgart, 70372".into()),
            provider: "ors-remote".into(),
            cost: CostModel::default(),
            failed_destinations: 1,
        }
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("XLSX".parse::<ExportFormat>().unwrap(), ExportFormat::Spreadsheet);
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!(" text ".parse::<ExportFormat>().unwrap(), ExportFormat::PlainText);
        assert_eq!("pdf".parse::<ExportFormat>(), Err(UnknownFormat("pdf".into())));
    }

    #[test]
    fn file_names_carry_the_date() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        assert_eq!(ExportFormat::Spreadsheet.file_name(date), "Police_Routes_2024-05-17.xlsx");
        assert_eq!(ExportFormat::Csv.file_name(date), "Police_Routes_2024-05-17.csv");
        assert_eq!(ExportFormat::PlainText.file_name(date), "Police_Routes_2024-05-17.txt");
    }

    #[test]
    fn every_format_is_deterministic() {
        let results = [result("1", 70.0, 60.0), result("2", 12.5, 15.2)];
        let meta = metadata();
        for format in [ExportFormat::Spreadsheet, ExportFormat::Csv, ExportFormat::PlainText] {
            let first = export(&results, format, &meta).unwrap();
            let second = export(&results, format, &meta).unwrap();
            assert_eq!(first, second, "{format} export differs between runs");
        }
    }

    #[test]
    fn spreadsheet_is_a_zip_container() {
        let bytes = export(&[result("1", 70.0, 60.0)], ExportFormat::Spreadsheet, &metadata()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn text_and_csv_print_identical_totals_and_metadata() {
        let results = [result("1", 70.04, 59.6), result("2", 12.5, 15.2)];
        let meta = metadata();
        let csv = String::from_utf8(export(&results, ExportFormat::Csv, &meta).unwrap()).unwrap();
        let text = String::from_utf8(export(&results, ExportFormat::PlainText, &meta).unwrap()).unwrap();

        for (label, value) in crate::sdk::projection::summary(&results).lines() {
            assert!(csv.contains(&format!("{label},{value}")), "csv lacks {label}");
            assert!(text.contains(&format!("{label}: {value}")), "text lacks {label}");
        }
        for (label, value) in meta.lines() {
            let cell = if value.contains(',') { format!("\"{value}\"") } else { value.clone() };
            assert!(csv.contains(&format!("{label},{cell}")), "csv lacks {label}");
            assert!(text.contains(&format!("{label}: {value}")), "text lacks {label}");
        }
    }

    #[test]
    fn metadata_header_carries_cost_assumptions() {
        let lines = metadata().lines();
        assert!(lines.contains(&("Exported", "2024-05-17 14:30:00".to_string())));
        assert!(lines.contains(&("Routing provider", "ors-remote".to_string())));
        assert!(lines.contains(&("Fuel price", "1.75 EUR/L".to_string())));
        assert!(lines.contains(&("Consumption", "9.5 L/100km".to_string())));
    }
}

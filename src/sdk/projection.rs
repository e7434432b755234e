//! Read-only views over the canonical route results.
//!
//! Every function here is pure: the same results always produce the same
//! output, and totals are always recomputed from the results.

use crate::sdk::model::RouteResult;
use serde::Serialize;

pub const TABLE_HEADERS: [&str; 8] = [
    "Destination",
    "Type",
    "Address",
    "Distance (km)",
    "Duration (min)",
    "Fuel (L)",
    "Cost (EUR)",
    "Route type",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AggregateSummary {
    pub routes: usize,
    pub distance_km: f64,
    pub duration_min: f64,
    pub fuel_l: f64,
    pub cost_eur: f64,
}

impl AggregateSummary {
    /// Labelled, formatted totals as printed by every export format.
    pub fn lines(&self) -> [(&'static str, String); 5] {
        [
            ("Destinations", self.routes.to_string()),
            ("Total distance (km)", format_km(self.distance_km)),
            ("Total duration (min)", format_minutes(self.duration_min)),
            ("Total fuel (L)", format_litres(self.fuel_l)),
            ("Total cost (EUR)", format_eur(self.cost_eur)),
        ]
    }
}

pub fn summary(results: &[RouteResult]) -> AggregateSummary {
    results.iter().fold(AggregateSummary::default(), |acc, r| AggregateSummary {
        routes: acc.routes + 1,
        distance_km: acc.distance_km + r.distance_km,
        duration_min: acc.duration_min + r.duration_min,
        fuel_l: acc.fuel_l + r.estimated_fuel_l,
        cost_eur: acc.cost_eur + r.estimated_cost_eur,
    })
}

pub fn format_km(km: f64) -> String {
    format!("{:.1}", km)
}

pub fn format_minutes(minutes: f64) -> String {
    format!("{}", minutes.round() as i64)
}

pub fn format_litres(litres: f64) -> String {
    format!("{:.1}", litres)
}

pub fn format_eur(eur: f64) -> String {
    format!("{:.1}", eur)
}

/// One display row, borrowing the canonical record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableRow<'a> {
    pub position: usize,
    pub result: &'a RouteResult,
}

impl<'a> TableRow<'a> {
    pub fn name(&self) -> &'a str {
        &self.result.destination_name
    }

    pub fn type_label(&self) -> &'static str {
        self.result.destination_type.label()
    }

    pub fn address(&self) -> &'a str {
        &self.result.address
    }

    pub fn distance(&self) -> String {
        format_km(self.result.distance_km)
    }

    pub fn duration(&self) -> String {
        format_minutes(self.result.duration_min)
    }

    pub fn fuel(&self) -> String {
        format_litres(self.result.estimated_fuel_l)
    }

    pub fn cost(&self) -> String {
        format_eur(self.result.estimated_cost_eur)
    }

    pub fn route_type(&self) -> &'a str {
        &self.result.route_type
    }

    pub fn color(&self) -> &'a str {
        &self.result.color
    }

    /// Cells in [`TABLE_HEADERS`] order.
    pub fn cells(&self) -> [String; 8] {
        [
            self.name().to_string(),
            self.type_label().to_string(),
            self.address().to_string(),
            self.distance(),
            self.duration(),
            self.fuel(),
            self.cost(),
            self.route_type().to_string(),
        ]
    }
}

pub fn table(results: &[RouteResult]) -> Vec<TableRow<'_>> {
    results
        .iter()
        .enumerate()
        .map(|(position, result)| TableRow { position, result })
        .collect()
}

/// One line per route, for pasting into mail or chat.
pub fn clipboard_text(results: &[RouteResult]) -> String {
    results
        .iter()
        .map(|r| {
            format!(
                "{}: {} - {}km, {}min",
                r.destination_name,
                r.address,
                format_km(r.distance_km),
                format_minutes(r.duration_min)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

use serde::{Deserialize, Serialize};

/// Distance and travel time of one computed route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub distance_km: f64,
    pub duration_min: f64,
}

impl RouteSummary {
    pub fn zero() -> Self {
        Self {
            distance_km: 0.0,
            duration_min: 0.0,
        }
    }

    /// Converts ORS units (meters, seconds).
    pub fn from_ors(distance_m: f64, duration_s: f64) -> Self {
        Self {
            distance_km: distance_m / 1000.0,
            duration_min: duration_s / 60.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_ors_units() {
        let summary = RouteSummary::from_ors(70_000.0, 3_600.0);
        assert_eq!(summary.distance_km, 70.0);
        assert_eq!(summary.duration_min, 60.0);
    }
}

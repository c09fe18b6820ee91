//! Transport + production CO2 estimate per kilogram of produce.

use serde::Serialize;

/// kg CO2 per kg of produce per km.
pub const AIR_FREIGHT_FACTOR: f64 = 0.000_25;
pub const SEA_FREIGHT_FACTOR: f64 = 0.000_03;
pub const ROAD_LONG_FACTOR: f64 = 0.000_15;
pub const ROAD_SHORT_FACTOR: f64 = 0.000_10;

/// Beyond this, produce travels by air or sea.
pub const LONG_HAUL_KM: f64 = 5000.0;
/// Below this, produce travels by short-haul road.
pub const SHORT_HAUL_KM: f64 = 1000.0;

const PRODUCTION_BASE: f64 = 0.1;
const PRODUCTION_REFRIGERATED: f64 = 0.2;

/// Spoils too fast for sea freight on long routes.
const PERISHABLE: &[&str] = &["berry", "berries", "avocado", "mango", "papaya", "asparagus"];

/// Needs cold storage through the supply chain.
const REFRIGERATED: &[&str] = &["avocado", "asparagus", "berries", "berry"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Air,
    Sea,
    RoadLong,
    RoadShort,
}

impl TransportMode {
    #[must_use]
    pub fn factor(self) -> f64 {
        match self {
            Self::Air => AIR_FREIGHT_FACTOR,
            Self::Sea => SEA_FREIGHT_FACTOR,
            Self::RoadLong => ROAD_LONG_FACTOR,
            Self::RoadShort => ROAD_SHORT_FACTOR,
        }
    }
}

/// Deterministic emission heuristic: same distance and name, same answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmissionModel;

impl EmissionModel {
    #[must_use]
    pub fn transport_mode(self, distance_km: f64, produce: &str) -> TransportMode {
        let distance_km = sanitize_km(distance_km);
        if distance_km > LONG_HAUL_KM {
            if matches_any(produce, PERISHABLE) {
                TransportMode::Air
            } else {
                TransportMode::Sea
            }
        } else if distance_km >= SHORT_HAUL_KM {
            TransportMode::RoadLong
        } else {
            TransportMode::RoadShort
        }
    }

    #[must_use]
    pub fn production_emissions(self, produce: &str) -> f64 {
        if matches_any(produce, REFRIGERATED) {
            PRODUCTION_REFRIGERATED
        } else {
            PRODUCTION_BASE
        }
    }

    /// kg CO2 per kg, rounded to two decimals, never negative.
    #[must_use]
    pub fn estimate(self, distance_km: f64, produce: &str) -> f64 {
        let distance_km = sanitize_km(distance_km);
        let transport = distance_km * self.transport_mode(distance_km, produce).factor();
        round2(transport + self.production_emissions(produce))
    }
}

fn sanitize_km(km: f64) -> f64 {
    if km.is_finite() {
        km.max(0.0)
    } else {
        0.0
    }
}

fn matches_any(produce: &str, keywords: &[&str]) -> bool {
    let name = produce.to_lowercase();
    keywords.iter().any(|k| name.contains(k))
}

/// Round to two decimal places, clamping at zero.
#[must_use]
pub fn round2(value: f64) -> f64 {
    ((value * 100.0).round() / 100.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn long_haul_avocado_flies() {
        let model = EmissionModel;
        assert_eq!(model.transport_mode(9200.0, "avocado"), TransportMode::Air);
        assert!(approx(model.estimate(9200.0, "avocado"), 2.50));
    }

    #[test]
    fn long_haul_apple_ships() {
        let model = EmissionModel;
        assert_eq!(model.transport_mode(9200.0, "apple"), TransportMode::Sea);
        // 9200 * 0.00003 = 0.276, + 0.1
        assert!(approx(model.estimate(9200.0, "apple"), 0.38));
    }

    #[test]
    fn tier_boundaries() {
        let model = EmissionModel;
        assert_eq!(model.transport_mode(5000.0, "mango"), TransportMode::RoadLong);
        assert_eq!(model.transport_mode(5000.1, "mango"), TransportMode::Air);
        assert_eq!(model.transport_mode(1000.0, "kale"), TransportMode::RoadLong);
        assert_eq!(model.transport_mode(999.9, "kale"), TransportMode::RoadShort);
    }

    #[test]
    fn strawberries_count_as_perishable_and_refrigerated() {
        let model = EmissionModel;
        assert_eq!(model.transport_mode(6000.0, "Strawberries"), TransportMode::Air);
        assert!(approx(model.production_emissions("strawberry"), 0.2));
    }

    #[test]
    fn zero_and_invalid_distances_leave_production_only() {
        let model = EmissionModel;
        assert!(approx(model.estimate(0.0, "carrot"), 0.1));
        assert!(approx(model.estimate(-50.0, "carrot"), 0.1));
        assert!(approx(model.estimate(f64::NAN, "asparagus"), 0.2));
    }

    #[test]
    fn estimates_are_repeatable_and_two_decimal() {
        let model = EmissionModel;
        for km in [0.0, 12.3, 999.0, 1430.0, 4999.5, 7321.7, 18_000.0] {
            for name in ["avocado", "potato", "blueberries"] {
                let a = model.estimate(km, name);
                assert!(approx(a, model.estimate(km, name)));
                assert!(a >= 0.0);
                assert!(approx(a, (a * 100.0).round() / 100.0));
            }
        }
    }
}

//! Flood-risk forecast derivation
//!
//! A deterministic placeholder: the same coordinate always yields the same
//! four entries, bit for bit. It is not a hydrological model.

use crate::models::{Coordinate, ForecastEntry, Location, RiskLevel};

/// Forecast horizons in hours, ascending
pub const HORIZONS_HOURS: [u32; 4] = [2, 5, 10, 24];

/// Added to the value of each later horizon
const HORIZON_STEP: f64 = 0.08;

/// Flood-risk forecast service
pub struct ForecastEngine;

impl ForecastEngine {
    /// Risk entries for every horizon in [`HORIZONS_HOURS`], in that order
    #[must_use]
    pub fn forecast(coordinate: &Coordinate) -> Vec<ForecastEntry> {
        let seed = Self::seed(coordinate);

        HORIZONS_HOURS
            .iter()
            .enumerate()
            .map(|(i, &horizon_hours)| {
                let step = i as u64;
                let rand = ((seed * (step + 1)) % 100) as f64 / 100.0;
                let value = (rand + step as f64 * HORIZON_STEP).min(1.0);
                ForecastEntry {
                    horizon_hours,
                    risk_level: RiskLevel::from_value(value),
                    risk_percent: (value * 100.0).round() as u8,
                }
            })
            .collect()
    }

    /// Forecast for the coordinate of `location`
    #[must_use]
    pub fn forecast_location(location: &Location) -> Vec<ForecastEntry> {
        Self::forecast(&location.coordinate)
    }

    fn seed(coordinate: &Coordinate) -> u64 {
        // |lat + lon| <= 270, so the scaled value fits comfortably in u64
        let scaled = ((coordinate.latitude() + coordinate.longitude()).abs() * 10_000.0).floor();
        (scaled as u64) % 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    fn summary(entries: &[ForecastEntry]) -> Vec<(u32, RiskLevel, u8)> {
        entries
            .iter()
            .map(|e| (e.horizon_hours, e.risk_level, e.risk_percent))
            .collect()
    }

    #[test]
    fn test_san_francisco_forecast() {
        let entries = ForecastEngine::forecast(&coord(37.78825, -122.4324));
        assert_eq!(
            summary(&entries),
            vec![
                (2, RiskLevel::Low, 41),
                (5, RiskLevel::High, 90),
                (10, RiskLevel::Low, 39),
                (24, RiskLevel::High, 88),
            ]
        );
    }

    #[test]
    fn test_moderate_bucket() {
        // seed 60
        let entries = ForecastEngine::forecast(&coord(0.006, 0.0));
        assert_eq!(
            summary(&entries),
            vec![
                (2, RiskLevel::Moderate, 60),
                (5, RiskLevel::Low, 28),
                (10, RiskLevel::High, 96),
                (24, RiskLevel::Moderate, 64),
            ]
        );
    }

    #[test]
    fn test_zero_seed_only_grows_with_horizon() {
        let entries = ForecastEngine::forecast(&coord(0.0, 0.0));
        let percents: Vec<u8> = entries.iter().map(|e| e.risk_percent).collect();
        assert_eq!(percents, vec![0, 8, 16, 24]);
    }

    #[rstest]
    #[case(37.78825, -122.4324)]
    #[case(-33.8688, 151.2093)]
    #[case(90.0, 180.0)]
    #[case(-90.0, -180.0)]
    #[case(51.5074, -0.1278)]
    fn test_forecast_properties(#[case] lat: f64, #[case] lon: f64) {
        let c = coord(lat, lon);
        let first = ForecastEngine::forecast(&c);
        let second = ForecastEngine::forecast(&c);
        assert_eq!(first, second);

        let horizons: Vec<u32> = first.iter().map(|e| e.horizon_hours).collect();
        assert_eq!(horizons, HORIZONS_HOURS.to_vec());

        for entry in &first {
            assert!(entry.risk_percent <= 100);
            let expected = RiskLevel::from_value(f64::from(entry.risk_percent) / 100.0);
            assert_eq!(entry.risk_level, expected);
        }
    }
}

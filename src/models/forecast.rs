//! Flood-risk forecast entry model

use serde::{Deserialize, Serialize};

/// Risk bucket for one forecast horizon
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    /// Value at or below 0.5
    Low,
    /// Value in (0.5, 0.8]
    Moderate,
    /// Value above 0.8
    High,
}

impl RiskLevel {
    /// Classify a risk value in `[0, 1]`
    #[must_use]
    pub fn from_value(value: f64) -> Self {
        if value > 0.8 {
            RiskLevel::High
        } else if value > 0.5 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
        }
    }
}

/// Predicted flood risk for one horizon
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ForecastEntry {
    /// Hours ahead of now
    pub horizon_hours: u32,
    pub risk_level: RiskLevel,
    /// Risk as a whole percentage (0-100)
    pub risk_percent: u8,
}

impl ForecastEntry {
    /// Format as a single display line, e.g. `"+5h  High (90%)"`
    #[must_use]
    pub fn format_line(&self) -> String {
        format!(
            "+{}h  {} ({}%)",
            self.horizon_hours,
            self.risk_level.label(),
            self.risk_percent
        )
    }
}

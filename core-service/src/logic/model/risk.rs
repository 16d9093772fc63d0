//! Risk Banding
//!
//! Pure step function from the displayed percentage to a qualitative band.
//! Used for rendering only, never for control flow.

use serde::{Deserialize, Serialize};

/// Percentage at which Medium starts
pub const MEDIUM_THRESHOLD: f64 = 30.0;

/// Percentage at which High starts
pub const HIGH_THRESHOLD: f64 = 60.0;

/// Risk classification levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    /// [0, 30)
    Low,
    /// [30, 60)
    Medium,
    /// [60, 100]
    High,
}

impl RiskBand {
    pub fn from_percent(percent: f64) -> Self {
        if percent < MEDIUM_THRESHOLD {
            RiskBand::Low
        } else if percent < HIGH_THRESHOLD {
            RiskBand::Medium
        } else {
            RiskBand::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::Low => "low",
            RiskBand::Medium => "medium",
            RiskBand::High => "high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskBand::Low => "Low",
            RiskBand::Medium => "Medium",
            RiskBand::High => "High",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskBand::Low => "green",
            RiskBand::Medium => "orange",
            RiskBand::High => "red",
        }
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

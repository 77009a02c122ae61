pub mod engine;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::facility::{Coordinate, Facility};
use crate::standards::{FacilityCategory, Grade};

/// Proximity quality of a single facility distance, best to worst.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationTier {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ClassificationTier {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        }
    }

    /// Marker color consumed by the map layer.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Excellent => "#2ecc71",
            Self::Good => "#3498db",
            Self::Fair => "#f39c12",
            Self::Poor => "#e74c3c",
        }
    }

    /// Fraction of the category weight awarded to the aggregate score.
    /// Classification shows four tiers; scoring recognizes three non-zero
    /// bands.
    pub fn credit_fraction(&self) -> f64 {
        match self {
            Self::Excellent => 1.0,
            Self::Good => 0.7,
            Self::Fair => 0.4,
            Self::Poor => 0.0,
        }
    }
}

impl std::fmt::Display for ClassificationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryStatistics {
    pub category: FacilityCategory,
    pub count: usize,
    pub nearest: Option<Facility>,
    pub average_distance_m: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryContribution {
    pub category: FacilityCategory,
    pub nearest_distance_m: Option<f64>,
    pub tier: Option<ClassificationTier>,
    pub points: f64,
    pub max_points: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProximityScore {
    pub total_score: u8,
    pub grade: Grade,
    pub contributions: Vec<CategoryContribution>,
}

impl ProximityScore {
    pub fn contribution(&self, category: FacilityCategory) -> Option<&CategoryContribution> {
        self.contributions.iter().find(|c| c.category == category)
    }
}

/// Everything one analysis produces for the UI and report layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteAnalysis {
    pub origin: Coordinate,
    pub statistics: Vec<CategoryStatistics>,
    pub score: ProximityScore,
    pub summary: Vec<String>,
    pub analyzed_at: DateTime<Utc>,
    pub standard_fingerprint: String,
}

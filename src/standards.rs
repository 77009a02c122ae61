use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FacilityCategory {
    School,
    Hospital,
    Convenience,
    Subway,
}

impl FacilityCategory {
    pub const ALL: [FacilityCategory; 4] = [
        FacilityCategory::School,
        FacilityCategory::Hospital,
        FacilityCategory::Convenience,
        FacilityCategory::Subway,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::School => "school",
            Self::Hospital => "hospital",
            Self::Convenience => "convenience",
            Self::Subway => "subway",
        }
    }
}

impl Display for FacilityCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::School => "School",
            Self::Hospital => "Hospital",
            Self::Convenience => "Convenience",
            Self::Subway => "Subway",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown facility category: {0}")]
pub struct CategoryParseError(pub String);

impl FromStr for FacilityCategory {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "school" | "schools" | "education" => Ok(Self::School),
            "hospital" | "hospitals" | "medical" | "clinic" => Ok(Self::Hospital),
            "convenience" | "convenience_store" | "store" | "cvs" => Ok(Self::Convenience),
            "subway" | "metro" | "station" | "transit" => Ok(Self::Subway),
            _ => Err(CategoryParseError(s.to_string())),
        }
    }
}

/// Distance bounds and scoring weight for one facility category.
/// Bounds are inclusive upper limits in meters, ascending.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CategoryThresholds {
    pub excellent_m: f64,
    pub good_m: f64,
    pub fair_m: f64,
    pub weight: f64,
    pub max_search_radius_m: f64,
}

impl CategoryThresholds {
    pub fn validate(&self, category: FacilityCategory) -> Result<(), StandardError> {
        let ordered = self.excellent_m < self.good_m && self.good_m < self.fair_m;
        let finite = [
            self.excellent_m,
            self.good_m,
            self.fair_m,
            self.weight,
            self.max_search_radius_m,
        ]
        .iter()
        .all(|v| v.is_finite() && *v >= 0.0);
        if !ordered || !finite {
            return Err(StandardError::InvalidThresholds { category });
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum StandardError {
    #[error("thresholds for {category} must be finite and strictly ascending")]
    InvalidThresholds { category: FacilityCategory },
}

/// Category absent from the configured standard: generic three-tier bounds.
pub const GENERIC_CLOSE_M: f64 = 300.0;
pub const GENERIC_MEDIUM_M: f64 = 800.0;

/// The site-evaluation standard: per-category distance bounds and weights.
/// Immutable once built; passed explicitly into every engine call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringStandard {
    pub categories: BTreeMap<FacilityCategory, CategoryThresholds>,
}

impl ScoringStandard {
    /// Default bounds mirroring the LH public-housing site criteria.
    pub fn lh_default() -> Self {
        let mut categories = BTreeMap::new();
        categories.insert(
            FacilityCategory::School,
            CategoryThresholds {
                excellent_m: 300.0,
                good_m: 600.0,
                fair_m: 1000.0,
                weight: 30.0,
                max_search_radius_m: 1500.0,
            },
        );
        categories.insert(
            FacilityCategory::Hospital,
            CategoryThresholds {
                excellent_m: 500.0,
                good_m: 1000.0,
                fair_m: 2000.0,
                weight: 25.0,
                max_search_radius_m: 3000.0,
            },
        );
        categories.insert(
            FacilityCategory::Convenience,
            CategoryThresholds {
                excellent_m: 200.0,
                good_m: 400.0,
                fair_m: 800.0,
                weight: 20.0,
                max_search_radius_m: 1000.0,
            },
        );
        categories.insert(
            FacilityCategory::Subway,
            CategoryThresholds {
                excellent_m: 500.0,
                good_m: 800.0,
                fair_m: 1200.0,
                weight: 25.0,
                max_search_radius_m: 1500.0,
            },
        );
        Self { categories }
    }

    pub fn thresholds(&self, category: FacilityCategory) -> Option<&CategoryThresholds> {
        self.categories.get(&category)
    }

    pub fn validate(&self) -> Result<(), StandardError> {
        for (category, thresholds) in &self.categories {
            thresholds.validate(*category)?;
        }
        Ok(())
    }

    /// Stable content hash of the standard, carried on analysis results.
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_string(&self.categories).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

impl Default for ScoringStandard {
    fn default() -> Self {
        Self::lh_default()
    }
}

/// Letter grade over the aggregate proximity score. Cutoffs are fixed and
/// independent from the per-facility classification bounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl Grade {
    pub fn from_score(total_score: u8) -> Self {
        match total_score {
            85..=u8::MAX => Self::A,
            70..=84 => Self::B,
            55..=69 => Self::C,
            _ => Self::D,
        }
    }
}

impl Display for Grade {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        };
        write!(f, "{display}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_standard_is_valid_and_weights_sum_to_100() {
        let standard = ScoringStandard::lh_default();
        standard.validate().expect("default standard must validate");
        let total: f64 = standard.categories.values().map(|t| t.weight).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_unordered_thresholds() {
        let mut standard = ScoringStandard::lh_default();
        let thresholds = standard
            .categories
            .get_mut(&FacilityCategory::School)
            .unwrap();
        thresholds.good_m = thresholds.excellent_m;
        assert!(standard.validate().is_err());
    }

    #[test]
    fn parses_category_aliases() {
        assert_eq!(
            FacilityCategory::from_str("metro").unwrap(),
            FacilityCategory::Subway
        );
        assert_eq!(
            FacilityCategory::from_str("CVS").unwrap(),
            FacilityCategory::Convenience
        );
        assert!(FacilityCategory::from_str("casino").is_err());
    }

    #[test]
    fn grade_cutoffs() {
        assert_eq!(Grade::from_score(85), Grade::A);
        assert_eq!(Grade::from_score(84), Grade::B);
        assert_eq!(Grade::from_score(70), Grade::B);
        assert_eq!(Grade::from_score(69), Grade::C);
        assert_eq!(Grade::from_score(55), Grade::C);
        assert_eq!(Grade::from_score(54), Grade::D);
        assert_eq!(Grade::from_score(0), Grade::D);
    }

    #[test]
    fn fingerprint_is_stable_and_sensitive() {
        let a = ScoringStandard::lh_default();
        let b = ScoringStandard::lh_default();
        assert_eq!(a.fingerprint(), b.fingerprint());

        let mut c = ScoringStandard::lh_default();
        c.categories
            .get_mut(&FacilityCategory::Subway)
            .unwrap()
            .weight = 26.0;
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}

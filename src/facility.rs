use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::standards::FacilityCategory;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self, FacilityError> {
        if !lat.is_finite() || !lng.is_finite() || lat.abs() > 90.0 || lng.abs() > 180.0 {
            return Err(FacilityError::InvalidCoordinate { lat, lng });
        }
        Ok(Self { lat, lng })
    }
}

/// One point of interest near the analysis target. Request-scoped and
/// immutable: a fresh set is built per analysis and discarded afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Facility {
    pub name: String,
    pub category: FacilityCategory,
    pub coordinate: Coordinate,
    pub distance_m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
}

impl Facility {
    /// Validating constructor: the only way malformed provider records are
    /// kept out of the scoring path. Negative or non-finite distances are
    /// rejected here rather than clamped.
    pub fn new(
        name: impl Into<String>,
        category: FacilityCategory,
        coordinate: Coordinate,
        distance_m: f64,
    ) -> Result<Self, FacilityError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(FacilityError::EmptyName { category });
        }
        if !distance_m.is_finite() || distance_m < 0.0 {
            return Err(FacilityError::InvalidDistance {
                category,
                distance_m,
            });
        }
        Ok(Self {
            name,
            category,
            coordinate,
            distance_m,
            line: None,
        })
    }

    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        let line = line.into();
        if !line.trim().is_empty() {
            self.line = Some(line);
        }
        self
    }
}

#[derive(Debug, Error)]
pub enum FacilityError {
    #[error("facility in {category} has an empty name")]
    EmptyName { category: FacilityCategory },
    #[error("facility in {category} has invalid distance {distance_m}")]
    InvalidDistance {
        category: FacilityCategory,
        distance_m: f64,
    },
    #[error("coordinate out of range: lat {lat}, lng {lng}")]
    InvalidCoordinate { lat: f64, lng: f64 },
}

/// Facilities grouped under the four fixed categories. A key absent from the
/// wire payload deserializes to an empty list, never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FacilitySet {
    #[serde(default)]
    pub school: Vec<Facility>,
    #[serde(default)]
    pub hospital: Vec<Facility>,
    #[serde(default)]
    pub convenience: Vec<Facility>,
    #[serde(default)]
    pub subway: Vec<Facility>,
}

impl FacilitySet {
    pub fn get(&self, category: FacilityCategory) -> &[Facility] {
        match category {
            FacilityCategory::School => &self.school,
            FacilityCategory::Hospital => &self.hospital,
            FacilityCategory::Convenience => &self.convenience,
            FacilityCategory::Subway => &self.subway,
        }
    }

    pub fn insert(&mut self, category: FacilityCategory, facilities: Vec<Facility>) {
        match category {
            FacilityCategory::School => self.school = facilities,
            FacilityCategory::Hospital => self.hospital = facilities,
            FacilityCategory::Convenience => self.convenience = facilities,
            FacilityCategory::Subway => self.subway = facilities,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (FacilityCategory, &[Facility])> + '_ {
        FacilityCategory::ALL
            .into_iter()
            .map(move |category| (category, self.get(category)))
    }

    pub fn total_count(&self) -> usize {
        self.iter().map(|(_, facilities)| facilities.len()).sum()
    }

    /// Re-check the `Facility::new` invariants on a deserialized set.
    /// Serde bypasses the validating constructor, so caller-supplied
    /// payloads go through here before scoring.
    pub fn validate(&self) -> Result<(), FacilityError> {
        for (category, facilities) in self.iter() {
            for facility in facilities {
                if facility.name.trim().is_empty() {
                    return Err(FacilityError::EmptyName { category });
                }
                if !facility.distance_m.is_finite() || facility.distance_m < 0.0 {
                    return Err(FacilityError::InvalidDistance {
                        category,
                        distance_m: facility.distance_m,
                    });
                }
            }
        }
        Ok(())
    }
}

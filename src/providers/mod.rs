pub mod http;
pub mod kakao;
pub mod sample;

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::facility::{Coordinate, Facility, FacilitySet};
use crate::geo::haversine_distance_m;
use crate::providers::kakao::KakaoLocalProvider;
use crate::providers::sample::SampleProvider;
use crate::standards::{FacilityCategory, ScoringStandard};

/// Raw facility as it arrives from a provider, before validation. Distance
/// may be absent when the provider does not precompute it; ingestion then
/// derives it from the coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityRecord {
    pub name: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub distance_m: Option<f64>,
    pub line: Option<String>,
}

#[async_trait]
pub trait FacilityProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch_category(
        &self,
        origin: Coordinate,
        category: FacilityCategory,
        radius_m: f64,
    ) -> Result<Vec<FacilityRecord>>;
}

pub fn provider_from_config(config: &ProviderConfig) -> Result<Arc<dyn FacilityProvider>> {
    match config.kind.trim().to_ascii_lowercase().as_str() {
        "kakao" => {
            if config.kakao_api_key.trim().is_empty() {
                bail!("provider kind is \"kakao\" but no kakao_api_key is configured");
            }
            Ok(Arc::new(KakaoLocalProvider::new(
                config.kakao_api_key.clone(),
                config.kakao_base_url.clone(),
            )))
        }
        "sample" => Ok(Arc::new(SampleProvider)),
        other => bail!("unknown provider kind: {other} (expected \"kakao\" or \"sample\")"),
    }
}

/// Turn raw records into validated facilities. Malformed entries are dropped
/// with a warning rather than failing the whole category.
pub fn ingest_records(
    origin: Coordinate,
    category: FacilityCategory,
    records: Vec<FacilityRecord>,
) -> Vec<Facility> {
    let mut facilities = Vec::with_capacity(records.len());
    for record in records {
        let coordinate = match (record.lat, record.lng) {
            (Some(lat), Some(lng)) => match Coordinate::new(lat, lng) {
                Ok(coordinate) => coordinate,
                Err(error) => {
                    warn!("dropping {category} record \"{}\": {error}", record.name);
                    continue;
                }
            },
            _ => {
                warn!(
                    "dropping {category} record \"{}\": missing coordinates",
                    record.name
                );
                continue;
            }
        };
        let distance_m = record
            .distance_m
            .unwrap_or_else(|| haversine_distance_m(origin, coordinate));
        let facility = match Facility::new(record.name, category, coordinate, distance_m) {
            Ok(facility) => facility,
            Err(error) => {
                warn!("dropping {category} record: {error}");
                continue;
            }
        };
        let facility = match record.line {
            Some(line) => facility.with_line(line),
            None => facility,
        };
        facilities.push(facility);
    }
    facilities
}

/// Fetch and ingest all four categories around the origin. Each category is
/// searched out to its configured radius and trimmed back to it afterwards,
/// since not every provider honors the radius parameter exactly.
pub async fn fetch_facility_set(
    provider: &dyn FacilityProvider,
    origin: Coordinate,
    standard: &ScoringStandard,
) -> Result<FacilitySet> {
    const FALLBACK_RADIUS_M: f64 = 1500.0;

    let mut set = FacilitySet::default();
    for category in FacilityCategory::ALL {
        let radius_m = standard
            .thresholds(category)
            .map(|t| t.max_search_radius_m)
            .unwrap_or(FALLBACK_RADIUS_M);
        let records = provider.fetch_category(origin, category, radius_m).await?;
        let mut facilities = ingest_records(origin, category, records);
        facilities.retain(|f| f.distance_m <= radius_m);
        debug!(
            "{category}: {} facilities within {radius_m}m via {}",
            facilities.len(),
            provider.name()
        );
        set.insert(category, facilities);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, lat: f64, lng: f64, distance_m: Option<f64>) -> FacilityRecord {
        FacilityRecord {
            name: name.to_string(),
            lat: Some(lat),
            lng: Some(lng),
            distance_m,
            line: None,
        }
    }

    #[test]
    fn ingest_derives_missing_distance_from_coordinates() {
        let origin = Coordinate::new(37.4979, 127.0276).unwrap();
        let facilities = ingest_records(
            origin,
            FacilityCategory::School,
            vec![record("Daechi Elementary", 37.4946, 127.0628, None)],
        );
        assert_eq!(facilities.len(), 1);
        // ~3.1km east of the origin
        assert!(facilities[0].distance_m > 2_500.0 && facilities[0].distance_m < 3_500.0);
    }

    #[test]
    fn ingest_drops_malformed_records() {
        let origin = Coordinate::new(37.4979, 127.0276).unwrap();
        let records = vec![
            record("Valid", 37.4946, 127.0628, Some(250.0)),
            record("Negative", 37.4946, 127.0628, Some(-3.0)),
            record("OffTheGlobe", 95.0, 127.0628, Some(100.0)),
            FacilityRecord {
                name: "NoCoordinates".to_string(),
                lat: None,
                lng: None,
                distance_m: Some(100.0),
                line: None,
            },
        ];
        let facilities = ingest_records(origin, FacilityCategory::School, records);
        assert_eq!(facilities.len(), 1);
        assert_eq!(facilities[0].name, "Valid");
    }

    #[test]
    fn unknown_provider_kind_is_rejected() {
        let config = ProviderConfig {
            kind: "osm".to_string(),
            ..ProviderConfig::default()
        };
        assert!(provider_from_config(&config).is_err());
    }

    #[test]
    fn kakao_kind_requires_api_key() {
        let config = ProviderConfig {
            kind: "kakao".to_string(),
            ..ProviderConfig::default()
        };
        assert!(provider_from_config(&config).is_err());
    }
}

use anyhow::Result;
use async_trait::async_trait;

use crate::facility::Coordinate;
use crate::providers::{FacilityProvider, FacilityRecord};
use crate::standards::FacilityCategory;

/// Built-in facility fixtures for running without a provider API key.
/// Fixtures are fixed metric offsets from the requested origin, so results
/// are fully deterministic for any coordinate — no random placement.
#[derive(Debug, Clone, Copy)]
pub struct SampleProvider;

struct SampleFacility {
    name: &'static str,
    east_m: f64,
    north_m: f64,
    line: Option<&'static str>,
}

const SCHOOLS: &[SampleFacility] = &[
    SampleFacility {
        name: "Daechi Elementary School",
        east_m: 300.0,
        north_m: 165.0,
        line: None,
    },
    SampleFacility {
        name: "Daehyun Middle School",
        east_m: -520.0,
        north_m: 310.0,
        line: None,
    },
    SampleFacility {
        name: "Yeoksam High School",
        east_m: 880.0,
        north_m: -410.0,
        line: None,
    },
];

const HOSPITALS: &[SampleFacility] = &[
    SampleFacility {
        name: "Samsung Medical Center",
        east_m: 560.0,
        north_m: -270.0,
        line: None,
    },
    SampleFacility {
        name: "Yonsei Family Clinic",
        east_m: -900.0,
        north_m: 620.0,
        line: None,
    },
];

const CONVENIENCE_STORES: &[SampleFacility] = &[
    SampleFacility {
        name: "GS25 Yeoksam Branch",
        east_m: -90.0,
        north_m: 130.0,
        line: None,
    },
    SampleFacility {
        name: "CU Teheran-ro Branch",
        east_m: 260.0,
        north_m: -240.0,
        line: None,
    },
    SampleFacility {
        name: "7-Eleven Daechi Branch",
        east_m: 610.0,
        north_m: 90.0,
        line: None,
    },
];

const SUBWAY_STATIONS: &[SampleFacility] = &[
    SampleFacility {
        name: "Gangnam Station",
        east_m: -420.0,
        north_m: -160.0,
        line: Some("Line 2"),
    },
    SampleFacility {
        name: "Yeoksam Station",
        east_m: 650.0,
        north_m: 410.0,
        line: Some("Line 2"),
    },
];

const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

fn offset_coordinate(origin: Coordinate, east_m: f64, north_m: f64) -> (f64, f64) {
    let lat = origin.lat + north_m / METERS_PER_DEGREE_LAT;
    let lng = origin.lng + east_m / (METERS_PER_DEGREE_LAT * origin.lat.to_radians().cos());
    (lat, lng)
}

#[async_trait]
impl FacilityProvider for SampleProvider {
    fn name(&self) -> &str {
        "sample"
    }

    async fn fetch_category(
        &self,
        origin: Coordinate,
        category: FacilityCategory,
        _radius_m: f64,
    ) -> Result<Vec<FacilityRecord>> {
        let fixtures = match category {
            FacilityCategory::School => SCHOOLS,
            FacilityCategory::Hospital => HOSPITALS,
            FacilityCategory::Convenience => CONVENIENCE_STORES,
            FacilityCategory::Subway => SUBWAY_STATIONS,
        };
        let records = fixtures
            .iter()
            .map(|fixture| {
                let (lat, lng) = offset_coordinate(origin, fixture.east_m, fixture.north_m);
                FacilityRecord {
                    name: fixture.name.to_string(),
                    lat: Some(lat),
                    lng: Some(lng),
                    distance_m: None,
                    line: fixture.line.map(str::to_string),
                }
            })
            .collect();
        Ok(records)
    }
}

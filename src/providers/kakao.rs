use anyhow::Result;
use async_trait::async_trait;

use crate::facility::Coordinate;
use crate::providers::http::{fetch_json, parse_facility_records};
use crate::providers::{FacilityProvider, FacilityRecord};
use crate::standards::FacilityCategory;

/// Facility search backed by the Kakao Local category API. One page of the
/// nearest results per category is enough for nearest-facility scoring.
#[derive(Debug, Clone)]
pub struct KakaoLocalProvider {
    api_key: String,
    base_url: String,
}

const PAGE_SIZE: usize = 15;
const MAX_RADIUS_M: f64 = 20_000.0;

impl KakaoLocalProvider {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self { api_key, base_url }
    }

    /// Kakao category group code for each facility category.
    pub fn category_group_code(category: FacilityCategory) -> &'static str {
        match category {
            FacilityCategory::School => "SC4",
            FacilityCategory::Hospital => "HP8",
            FacilityCategory::Convenience => "CS2",
            FacilityCategory::Subway => "SW8",
        }
    }
}

#[async_trait]
impl FacilityProvider for KakaoLocalProvider {
    fn name(&self) -> &str {
        "kakao-local"
    }

    async fn fetch_category(
        &self,
        origin: Coordinate,
        category: FacilityCategory,
        radius_m: f64,
    ) -> Result<Vec<FacilityRecord>> {
        let code = Self::category_group_code(category);
        let radius = radius_m.min(MAX_RADIUS_M).round() as i64;
        let url = format!(
            "{}/v2/local/search/category.json?category_group_code={code}&x={}&y={}&radius={radius}&sort=distance&size={PAGE_SIZE}",
            self.base_url.trim_end_matches('/'),
            origin.lng,
            origin.lat,
        );
        let auth = format!("KakaoAK {}", self.api_key);
        let payload = fetch_json(&url, Some(("Authorization", auth.as_str()))).await?;

        let mut records = parse_facility_records(
            &payload,
            &["place_name", "name"],
            &["y", "lat"],
            &["x", "lng"],
            &["distance"],
            &["category_name"],
            PAGE_SIZE,
        );
        for record in &mut records {
            record.line = match category {
                FacilityCategory::Subway => record.line.take().and_then(extract_line_name),
                _ => None,
            };
        }
        Ok(records)
    }
}

/// Kakao reports a station's line as the tail of its category chain, e.g.
/// "교통,수송 > 지하철,전철 > 수도권2호선".
fn extract_line_name(category_chain: String) -> Option<String> {
    let tail = category_chain.rsplit('>').next()?.trim();
    if tail.is_empty() {
        None
    } else {
        Some(tail.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_codes_match_kakao_groups() {
        assert_eq!(
            KakaoLocalProvider::category_group_code(FacilityCategory::School),
            "SC4"
        );
        assert_eq!(
            KakaoLocalProvider::category_group_code(FacilityCategory::Hospital),
            "HP8"
        );
        assert_eq!(
            KakaoLocalProvider::category_group_code(FacilityCategory::Convenience),
            "CS2"
        );
        assert_eq!(
            KakaoLocalProvider::category_group_code(FacilityCategory::Subway),
            "SW8"
        );
    }

    #[test]
    fn extracts_line_from_category_chain() {
        assert_eq!(
            extract_line_name("교통,수송 > 지하철,전철 > 수도권2호선".to_string()),
            Some("수도권2호선".to_string())
        );
        assert_eq!(extract_line_name("  ".to_string()), None);
    }
}

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use crate::facility::{Coordinate, FacilitySet};
use crate::providers::{fetch_facility_set, FacilityProvider};
use crate::scoring::engine::{build_summary, category_statistics, proximity_score};
use crate::scoring::SiteAnalysis;
use crate::standards::ScoringStandard;

/// Score caller-supplied facility lists. No I/O; the only non-pure touch is
/// the result timestamp.
pub fn score_facility_set(
    standard: &ScoringStandard,
    origin: Coordinate,
    set: &FacilitySet,
) -> SiteAnalysis {
    let statistics: Vec<_> = set
        .iter()
        .map(|(category, facilities)| category_statistics(category, facilities))
        .collect();
    let score = proximity_score(standard, set);
    let summary = build_summary(&statistics, &score);
    SiteAnalysis {
        origin,
        statistics,
        score,
        summary,
        analyzed_at: Utc::now(),
        standard_fingerprint: standard.fingerprint(),
    }
}

/// Full analysis: fetch facilities around the origin, then score them.
pub async fn analyze_site(
    provider: &dyn FacilityProvider,
    standard: &ScoringStandard,
    origin: Coordinate,
) -> Result<SiteAnalysis> {
    let set = fetch_facility_set(provider, origin, standard).await?;
    info!(
        "fetched {} facilities around ({}, {}) via {}",
        set.total_count(),
        origin.lat,
        origin.lng,
        provider.name()
    );
    Ok(score_facility_set(standard, origin, &set))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::sample::SampleProvider;

    #[tokio::test]
    async fn analysis_covers_all_categories_and_stamps_fingerprint() {
        let standard = ScoringStandard::lh_default();
        let origin = Coordinate::new(37.4979, 127.0276).unwrap();

        let analysis = analyze_site(&SampleProvider, &standard, origin)
            .await
            .unwrap();
        assert_eq!(analysis.statistics.len(), 4);
        assert!(analysis.statistics.iter().all(|s| s.count > 0));
        assert_eq!(analysis.standard_fingerprint, standard.fingerprint());
        // four category clauses plus the closing score clause
        assert_eq!(analysis.summary.len(), 5);
        assert!(analysis
            .summary
            .last()
            .unwrap()
            .starts_with("Overall proximity score"));
    }
}

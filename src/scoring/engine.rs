use crate::facility::{Facility, FacilitySet};
use crate::geo::format_distance;
use crate::scoring::{
    CategoryContribution, CategoryStatistics, ClassificationTier, ProximityScore,
};
use crate::standards::{
    FacilityCategory, Grade, ScoringStandard, GENERIC_CLOSE_M, GENERIC_MEDIUM_M,
};

/// Tier for one facility distance under a category's bounds. Bounds are
/// inclusive: a distance equal to a bound still earns that tier. A category
/// absent from the standard gets the generic three-tier classifier.
pub fn classify(
    standard: &ScoringStandard,
    category: FacilityCategory,
    distance_m: f64,
) -> ClassificationTier {
    let Some(thresholds) = standard.thresholds(category) else {
        return classify_generic(distance_m);
    };
    if distance_m <= thresholds.excellent_m {
        ClassificationTier::Excellent
    } else if distance_m <= thresholds.good_m {
        ClassificationTier::Good
    } else if distance_m <= thresholds.fair_m {
        ClassificationTier::Fair
    } else {
        ClassificationTier::Poor
    }
}

/// Generic close/medium/far classifier used when no category bounds exist.
pub fn classify_generic(distance_m: f64) -> ClassificationTier {
    if distance_m <= GENERIC_CLOSE_M {
        ClassificationTier::Excellent
    } else if distance_m <= GENERIC_MEDIUM_M {
        ClassificationTier::Good
    } else {
        ClassificationTier::Poor
    }
}

/// Facility with the minimum distance. Empty input is `None`, not an error.
/// Ties keep the first facility encountered.
pub fn find_nearest(facilities: &[Facility]) -> Option<&Facility> {
    facilities.iter().fold(None, |best, facility| match best {
        Some(current) if facility.distance_m >= current.distance_m => Some(current),
        _ => Some(facility),
    })
}

pub fn category_statistics(
    category: FacilityCategory,
    facilities: &[Facility],
) -> CategoryStatistics {
    let count = facilities.len();
    let average_distance_m = if count == 0 {
        0
    } else {
        let sum: f64 = facilities.iter().map(|f| f.distance_m).sum();
        (sum / count as f64).round() as u64
    };
    CategoryStatistics {
        category,
        count,
        nearest: find_nearest(facilities).cloned(),
        average_distance_m,
    }
}

/// Weighted nearest-facility score across all four categories.
pub fn proximity_score(standard: &ScoringStandard, set: &FacilitySet) -> ProximityScore {
    let mut contributions = Vec::with_capacity(FacilityCategory::ALL.len());
    let mut total = 0.0;

    for category in FacilityCategory::ALL {
        let max_points = standard
            .thresholds(category)
            .map(|t| t.weight)
            .unwrap_or(0.0);
        let (nearest_distance_m, tier, points) = match find_nearest(set.get(category)) {
            Some(nearest) => {
                let tier = classify(standard, category, nearest.distance_m);
                (
                    Some(nearest.distance_m),
                    Some(tier),
                    max_points * tier.credit_fraction(),
                )
            }
            None => (None, None, 0.0),
        };
        total += points;
        contributions.push(CategoryContribution {
            category,
            nearest_distance_m,
            tier,
            points,
            max_points,
        });
    }

    let total_score = total.round().clamp(0.0, 100.0) as u8;
    ProximityScore {
        total_score,
        grade: Grade::from_score(total_score),
        contributions,
    }
}

const SUMMARY_ORDER: [FacilityCategory; 4] = [
    FacilityCategory::School,
    FacilityCategory::Hospital,
    FacilityCategory::Subway,
    FacilityCategory::Convenience,
];

/// One clause per category with a nearest facility, then the overall score.
/// Categories with no facilities are silently omitted.
pub fn build_summary(statistics: &[CategoryStatistics], score: &ProximityScore) -> Vec<String> {
    let mut sentences = Vec::new();
    for category in SUMMARY_ORDER {
        let nearest = statistics
            .iter()
            .find(|s| s.category == category)
            .and_then(|s| s.nearest.as_ref());
        let Some(nearest) = nearest else {
            continue;
        };
        sentences.push(format!(
            "{category}'s nearest facility is {} ({})",
            nearest.name,
            format_distance(nearest.distance_m)
        ));
    }
    sentences.push(format!(
        "Overall proximity score {} (grade {})",
        score.total_score, score.grade
    ));
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facility::Coordinate;

    fn facility(category: FacilityCategory, name: &str, distance_m: f64) -> Facility {
        Facility::new(
            name,
            category,
            Coordinate::new(37.4979, 127.0276).unwrap(),
            distance_m,
        )
        .unwrap()
    }

    fn school(distance_m: f64) -> Facility {
        facility(FacilityCategory::School, "Daechi Elementary", distance_m)
    }

    #[test]
    fn school_boundaries_are_inclusive() {
        let standard = ScoringStandard::lh_default();
        let cases = [
            (300.0, ClassificationTier::Excellent),
            (300.0001, ClassificationTier::Good),
            (600.0, ClassificationTier::Good),
            (1000.0, ClassificationTier::Fair),
            (1000.1, ClassificationTier::Poor),
        ];
        for (distance, expected) in cases {
            assert_eq!(
                classify(&standard, FacilityCategory::School, distance),
                expected,
                "school at {distance}m"
            );
        }
    }

    #[test]
    fn classification_quality_never_improves_with_distance() {
        let standard = ScoringStandard::lh_default();
        for category in FacilityCategory::ALL {
            let mut previous = ClassificationTier::Excellent;
            for step in 0..500 {
                let tier = classify(&standard, category, step as f64 * 10.0);
                assert!(tier >= previous, "{category} regressed at {}m", step * 10);
                previous = tier;
            }
        }
    }

    #[test]
    fn missing_category_uses_generic_bounds() {
        let mut standard = ScoringStandard::lh_default();
        standard.categories.remove(&FacilityCategory::Subway);
        assert_eq!(
            classify(&standard, FacilityCategory::Subway, 300.0),
            ClassificationTier::Excellent
        );
        assert_eq!(
            classify(&standard, FacilityCategory::Subway, 800.0),
            ClassificationTier::Good
        );
        assert_eq!(
            classify(&standard, FacilityCategory::Subway, 800.1),
            ClassificationTier::Poor
        );
    }

    #[test]
    fn nearest_of_empty_is_none() {
        assert!(find_nearest(&[]).is_none());
    }

    #[test]
    fn nearest_picks_minimum_and_first_on_ties() {
        let facilities = vec![school(500.0), school(200.0), school(800.0)];
        assert_eq!(find_nearest(&facilities).unwrap().distance_m, 200.0);

        let tied = vec![
            facility(FacilityCategory::School, "First", 200.0),
            facility(FacilityCategory::School, "Second", 200.0),
        ];
        assert_eq!(find_nearest(&tied).unwrap().name, "First");
    }

    #[test]
    fn statistics_nearest_matches_true_minimum() {
        let facilities = vec![school(430.0), school(120.0), school(910.0)];
        let stats = category_statistics(FacilityCategory::School, &facilities);
        assert_eq!(stats.count, 3);
        let min = facilities
            .iter()
            .map(|f| f.distance_m)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(stats.nearest.unwrap().distance_m, min);
        // (430 + 120 + 910) / 3 = 486.66... -> 487
        assert_eq!(stats.average_distance_m, 487);
    }

    #[test]
    fn empty_statistics_average_is_zero() {
        let stats = category_statistics(FacilityCategory::Hospital, &[]);
        assert_eq!(stats.count, 0);
        assert!(stats.nearest.is_none());
        assert_eq!(stats.average_distance_m, 0);
    }

    #[test]
    fn all_excellent_scores_100_grade_a() {
        let standard = ScoringStandard::lh_default();
        let mut set = FacilitySet::default();
        set.school = vec![school(250.0)];
        set.hospital = vec![facility(FacilityCategory::Hospital, "Samsung Medical", 400.0)];
        set.convenience = vec![facility(FacilityCategory::Convenience, "GS25", 150.0)];
        set.subway = vec![facility(FacilityCategory::Subway, "Gangnam Station", 450.0)];

        let score = proximity_score(&standard, &set);
        assert_eq!(score.total_score, 100);
        assert_eq!(score.grade, Grade::A);
        for contribution in &score.contributions {
            assert_eq!(contribution.points, contribution.max_points);
        }
    }

    #[test]
    fn fair_band_awards_forty_percent() {
        let standard = ScoringStandard::lh_default();
        let mut set = FacilitySet::default();
        set.school = vec![school(900.0)];

        let score = proximity_score(&standard, &set);
        let contribution = score.contribution(FacilityCategory::School).unwrap();
        assert_eq!(contribution.tier, Some(ClassificationTier::Fair));
        assert!((contribution.points - 12.0).abs() < 1e-9);
        assert_eq!(score.total_score, 12);
        assert_eq!(score.grade, Grade::D);
    }

    #[test]
    fn empty_set_scores_zero_grade_d() {
        let standard = ScoringStandard::lh_default();
        let score = proximity_score(&standard, &FacilitySet::default());
        assert_eq!(score.total_score, 0);
        assert_eq!(score.grade, Grade::D);
        assert!(score.contributions.iter().all(|c| c.points == 0.0));
    }

    #[test]
    fn scoring_is_idempotent() {
        let standard = ScoringStandard::lh_default();
        let mut set = FacilitySet::default();
        set.school = vec![school(640.0)];
        set.subway = vec![facility(FacilityCategory::Subway, "Yeoksam Station", 780.0)];

        let first = proximity_score(&standard, &set);
        let second = proximity_score(&standard, &set);
        assert_eq!(first, second);
    }

    #[test]
    fn summary_skips_empty_categories_and_ends_with_score() {
        let standard = ScoringStandard::lh_default();
        let mut set = FacilitySet::default();
        set.school = vec![school(250.0)];
        set.subway = vec![facility(FacilityCategory::Subway, "Gangnam Station", 450.0)];

        let statistics: Vec<_> = set
            .iter()
            .map(|(category, facilities)| category_statistics(category, facilities))
            .collect();
        let score = proximity_score(&standard, &set);
        let summary = build_summary(&statistics, &score);

        assert_eq!(summary.len(), 3);
        assert_eq!(
            summary[0],
            "School's nearest facility is Daechi Elementary (250m)"
        );
        assert_eq!(
            summary[1],
            "Subway's nearest facility is Gangnam Station (450m)"
        );
        // School excellent (30) + Subway excellent (25) = 55 -> C
        assert_eq!(score.total_score, 55);
        assert_eq!(summary[2], "Overall proximity score 55 (grade C)");
    }

    #[test]
    fn summary_includes_convenience_after_subway() {
        let standard = ScoringStandard::lh_default();
        let mut set = FacilitySet::default();
        set.subway = vec![facility(FacilityCategory::Subway, "Gangnam Station", 450.0)];
        set.convenience = vec![facility(FacilityCategory::Convenience, "GS25", 1500.0)];

        let statistics: Vec<_> = set
            .iter()
            .map(|(category, facilities)| category_statistics(category, facilities))
            .collect();
        let score = proximity_score(&standard, &set);
        let summary = build_summary(&statistics, &score);

        assert_eq!(summary.len(), 3);
        assert!(summary[0].starts_with("Subway"));
        assert_eq!(summary[1], "Convenience's nearest facility is GS25 (1.5km)");
    }
}

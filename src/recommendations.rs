use serde::{Deserialize, Serialize};

use crate::geo::format_distance;
use crate::scoring::{ClassificationTier, ProximityScore};
use crate::standards::{FacilityCategory, ScoringStandard};

/// One concrete way to raise the aggregate score: which category to improve,
/// the distance bound the next-better band requires, and the exact points
/// recovered. Derived arithmetically from the score, never sampled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImprovementOpportunity {
    pub priority: usize,
    pub category: FacilityCategory,
    pub current_tier: Option<ClassificationTier>,
    pub target_tier: ClassificationTier,
    pub target_distance_m: f64,
    pub potential_gain_points: f64,
    pub rationale: String,
}

pub fn build_improvements(
    standard: &ScoringStandard,
    score: &ProximityScore,
    max_items: usize,
) -> Vec<ImprovementOpportunity> {
    let mut opportunities = Vec::new();

    for contribution in &score.contributions {
        let Some(thresholds) = standard.thresholds(contribution.category) else {
            continue;
        };
        let (target_tier, target_distance_m) = match contribution.tier {
            Some(ClassificationTier::Excellent) => continue,
            Some(ClassificationTier::Good) => {
                (ClassificationTier::Excellent, thresholds.excellent_m)
            }
            Some(ClassificationTier::Fair) => (ClassificationTier::Good, thresholds.good_m),
            Some(ClassificationTier::Poor) | None => {
                (ClassificationTier::Fair, thresholds.fair_m)
            }
        };
        let gain = thresholds.weight
            * (target_tier.credit_fraction()
                - contribution.tier.map(|t| t.credit_fraction()).unwrap_or(0.0));
        let rationale = match contribution.nearest_distance_m {
            Some(distance_m) => format!(
                "Nearest {} is {} away; one within {} lifts the tier to {} (+{:.1} points).",
                contribution.category,
                format_distance(distance_m),
                format_distance(target_distance_m),
                target_tier,
                gain
            ),
            None => format!(
                "No {} found; one within {} would add {:.1} points.",
                contribution.category,
                format_distance(target_distance_m),
                gain
            ),
        };
        opportunities.push(ImprovementOpportunity {
            priority: 0,
            category: contribution.category,
            current_tier: contribution.tier,
            target_tier,
            target_distance_m,
            potential_gain_points: gain,
            rationale,
        });
    }

    opportunities.sort_by(|a, b| b.potential_gain_points.total_cmp(&a.potential_gain_points));
    opportunities.truncate(max_items);
    for (index, opportunity) in opportunities.iter_mut().enumerate() {
        opportunity.priority = index + 1;
    }
    opportunities
}

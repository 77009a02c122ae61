use anyhow::Result;

use crate::scoring::{CategoryStatistics, ProximityScore};

pub fn statistics_to_csv(statistics: &[CategoryStatistics]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "category",
        "count",
        "nearest_name",
        "nearest_distance_m",
        "average_distance_m",
    ])?;
    for stats in statistics {
        writer.write_record([
            stats.category.as_slug().to_string(),
            stats.count.to_string(),
            stats
                .nearest
                .as_ref()
                .map(|n| n.name.clone())
                .unwrap_or_default(),
            stats
                .nearest
                .as_ref()
                .map(|n| format!("{:.0}", n.distance_m))
                .unwrap_or_default(),
            stats.average_distance_m.to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn score_to_csv(score: &ProximityScore) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "category",
        "nearest_distance_m",
        "tier",
        "points",
        "max_points",
    ])?;
    for contribution in &score.contributions {
        writer.write_record([
            contribution.category.as_slug().to_string(),
            contribution
                .nearest_distance_m
                .map(|d| format!("{d:.0}"))
                .unwrap_or_default(),
            contribution
                .tier
                .map(|t| t.label().to_lowercase())
                .unwrap_or_default(),
            format!("{:.1}", contribution.points),
            format!("{:.0}", contribution.max_points),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facility::FacilitySet;
    use crate::scoring::engine::proximity_score;
    use crate::standards::ScoringStandard;

    #[test]
    fn score_csv_has_one_row_per_category() {
        let score = proximity_score(&ScoringStandard::lh_default(), &FacilitySet::default());
        let rendered = score_to_csv(&score).unwrap();
        // header plus four categories
        assert_eq!(rendered.trim().lines().count(), 5);
        assert!(rendered.starts_with("category,"));
    }
}

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::geo::format_distance;
use crate::recommendations::ImprovementOpportunity;
use crate::scoring::{CategoryStatistics, ClassificationTier, ProximityScore};

fn tier_cell(tier: Option<ClassificationTier>) -> Cell {
    let Some(tier) = tier else {
        return Cell::new("-");
    };
    let color = match tier {
        ClassificationTier::Excellent => Color::Green,
        ClassificationTier::Good => Color::Blue,
        ClassificationTier::Fair => Color::Yellow,
        ClassificationTier::Poor => Color::Red,
    };
    Cell::new(tier.label()).fg(color)
}

pub fn render_statistics_table(statistics: &[CategoryStatistics]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Category",
        "Found",
        "Nearest",
        "Distance",
        "Avg Distance",
    ]);

    for stats in statistics {
        let (name, distance) = match &stats.nearest {
            Some(nearest) => {
                let name = match &nearest.line {
                    Some(line) => format!("{} ({line})", nearest.name),
                    None => nearest.name.clone(),
                };
                (name, format_distance(nearest.distance_m))
            }
            None => ("-".to_string(), "-".to_string()),
        };
        table.add_row(vec![
            stats.category.to_string(),
            stats.count.to_string(),
            name,
            distance,
            if stats.count == 0 {
                "-".to_string()
            } else {
                format_distance(stats.average_distance_m as f64)
            },
        ]);
    }
    table.to_string()
}

pub fn render_score_table(score: &ProximityScore) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Category", "Nearest", "Tier", "Points", "Max"]);

    for contribution in &score.contributions {
        table.add_row(Row::from(vec![
            Cell::new(contribution.category.to_string()),
            Cell::new(
                contribution
                    .nearest_distance_m
                    .map(format_distance)
                    .unwrap_or_else(|| "-".to_string()),
            ),
            tier_cell(contribution.tier),
            Cell::new(format!("{:.1}", contribution.points)),
            Cell::new(format!("{:.0}", contribution.max_points)),
        ]));
    }

    let mut rendered = table.to_string();
    rendered.push_str(&format!(
        "\nTotal: {} / 100 (grade {})",
        score.total_score, score.grade
    ));
    rendered
}

pub fn render_improvements_table(items: &[ImprovementOpportunity]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Priority",
        "Category",
        "Current",
        "Target",
        "Within",
        "Gain",
        "Rationale",
    ]);
    for item in items {
        table.add_row(Row::from(vec![
            Cell::new(item.priority.to_string()),
            Cell::new(item.category.to_string()),
            tier_cell(item.current_tier),
            tier_cell(Some(item.target_tier)),
            Cell::new(format_distance(item.target_distance_m)),
            Cell::new(format!("+{:.1}", item.potential_gain_points)),
            Cell::new(item.rationale.clone()),
        ]));
    }
    table.to_string()
}

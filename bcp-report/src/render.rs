//! Text rendering of a result tree
//!
//! Values are computed in kgCO2e; the table shows tCO2e.

use bcp_common::results::ResultRow;
use bcp_common::uncertainty;
use bcp_common::ResultNode;
use std::fmt::Write;

const KG_PER_TONNE: f64 = 1_000.0;
const LABEL_WIDTH: usize = 44;

pub fn to_tonnes(kg: f64) -> f64 {
    kg / KG_PER_TONNE
}

/// Indented table, one line per node. Leaves are skipped unless `leaves`.
pub fn render_text(tree: &ResultNode, leaves: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<width$} {:>12} {:>23} {:>4} {:>11}",
        "Category",
        "tCO2e",
        "95% interval (tCO2e)",
        "Q",
        "validated",
        width = LABEL_WIDTH
    );

    for row in tree.rows() {
        if !leaves && row.depth > 2 {
            continue;
        }
        out.push_str(&render_row(&row));
        out.push('\n');
    }
    out
}

fn render_row(row: &ResultRow) -> String {
    let label = format!("{}{}", "  ".repeat(row.depth), row.label);

    let (interval, quality) = match row.uncertainty {
        Some(sd) => {
            let ci = uncertainty::confidence_interval(row.value, sd);
            (
                format!("{:.3} - {:.3}", to_tonnes(ci.lower), to_tonnes(ci.upper)),
                uncertainty::rating(sd).to_string(),
            )
        }
        None => ("-".to_string(), "-".to_string()),
    };

    let mut line = format!(
        "{:<width$} {:>12.3} {:>23} {:>4} {:>11}",
        label,
        to_tonnes(row.value),
        interval,
        quality,
        format!("{}/{}", row.number_of_validated_emission_source, row.number_of_emission_source),
        width = LABEL_WIDTH
    );
    if row.excluded {
        line.push_str("  (excluded)");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcp_common::quality::QualityRatings;
    use bcp_common::{compute_results_by_post, AggregationOptions, EmissionSource, Environment, SubPost};

    fn cut_tree() -> ResultNode {
        let sources = vec![
            EmissionSource::new(SubPost::ExceptionalWaste, Some(430_000.0)).validated(true),
            EmissionSource::new(SubPost::Concessions, Some(1_250.0)).with_quality(QualityRatings::uniform(3)),
            EmissionSource::new(SubPost::Newsletters, Some(15.0)).answering("recipient_count"),
        ];
        compute_results_by_post(&sources, &AggregationOptions::new(Environment::Cut)).unwrap()
    }

    #[test]
    fn test_to_tonnes() {
        assert_eq!(to_tonnes(430_000.0), 430.0);
        assert_eq!(to_tonnes(0.0), 0.0);
    }

    #[test]
    fn test_render_shows_total_in_tonnes() {
        let text = render_text(&cut_tree(), false);
        let total = text.lines().nth(1).unwrap();
        assert!(total.starts_with("Total"));
        assert!(total.contains("431.250"));
        assert!(total.contains("1/3"));
    }

    #[test]
    fn test_render_marks_exclusions() {
        let text = render_text(&cut_tree(), false);
        let newsletters = text.lines().find(|l| l.trim_start().starts_with("Newsletters")).unwrap();
        assert!(newsletters.ends_with("(excluded)"));
        assert!(newsletters.contains("0.000"));
    }

    #[test]
    fn test_leaves_only_on_request() {
        let tree = cut_tree();
        let without = render_text(&tree, false);
        let with = render_text(&tree, true);
        assert_eq!(with.lines().count(), without.lines().count() + tree.leaves().len());
    }

    #[test]
    fn test_interval_only_for_rated_rows() {
        let text = render_text(&cut_tree(), false);
        let concessions = text.lines().find(|l| l.trim_start().starts_with("Concessions and drinks")).unwrap();
        assert!(concessions.contains(" - "));

        let waste = text.lines().find(|l| l.trim_start().starts_with("Exceptional waste")).unwrap();
        assert!(!waste.contains(" - "));
    }
}

use chrono::Utc;
use tracing::debug;

use crate::model::{
    Finding, GameTheoryContext, ProtocolRiskReport, RiskCategories, RiskCategory, Severity,
};

/// Fixed category weights. Game theory carries the most weight: strategic
/// failure modes are what the rest of the catalog cannot see.
pub const WEIGHT_ECONOMIC: f64 = 0.20;
pub const WEIGHT_GOVERNANCE: f64 = 0.15;
pub const WEIGHT_LIQUIDITY: f64 = 0.20;
pub const WEIGHT_COMPOSABILITY: f64 = 0.10;
pub const WEIGHT_MEV: f64 = 0.10;
pub const WEIGHT_GAME_THEORY: f64 = 0.25;

const MAX_RECOMMENDATIONS: usize = 5;
const RECOMMENDATION_CONFIDENCE: f64 = 0.7;

/// Combine the six category results into one report. Never fails: the
/// categories are already well-formed values and aggregation is pure
/// arithmetic plus text assembly.
pub fn aggregate_report(
    protocol: &str,
    address: &str,
    categories: RiskCategories,
) -> ProtocolRiskReport {
    let overall_score = weighted_score(&categories);
    let overall_severity = max_severity(&categories);

    let pooled: Vec<&Finding> = categories.iter().flat_map(|c| c.findings.iter()).collect();

    let summary = build_summary(&pooled, &categories.game_theory);
    let recommendations = build_recommendations(&pooled);
    let nash_equilibria = collect_equilibria(&categories.game_theory);
    let dominant_strategies = collect_strategies(&categories.game_theory);

    debug!(
        protocol,
        overall_score,
        severity = %overall_severity,
        findings = pooled.len(),
        "report aggregated"
    );

    ProtocolRiskReport {
        protocol: protocol.to_string(),
        address: address.to_string(),
        timestamp: Utc::now(),
        overall_score,
        overall_severity,
        categories,
        summary,
        recommendations,
        nash_equilibria,
        dominant_strategies,
    }
}

fn weighted_score(categories: &RiskCategories) -> f64 {
    let blended = categories.economic.score * WEIGHT_ECONOMIC
        + categories.governance.score * WEIGHT_GOVERNANCE
        + categories.liquidity.score * WEIGHT_LIQUIDITY
        + categories.composability.score * WEIGHT_COMPOSABILITY
        + categories.mev.score * WEIGHT_MEV
        + categories.game_theory.score * WEIGHT_GAME_THEORY;
    (blended * 10.0).round() / 10.0
}

/// Highest-ranked severity wins outright. Intentionally not derived from
/// the weighted score: one critical category must surface as critical even
/// when the average is moderate.
fn max_severity(categories: &RiskCategories) -> Severity {
    categories
        .iter()
        .map(|c| c.severity)
        .max()
        .unwrap_or(Severity::Low)
}

fn build_summary(pooled: &[&Finding], game_theory: &RiskCategory) -> String {
    let total = pooled.len();
    let high_confidence = pooled.iter().filter(|f| f.confidence > 0.7).count();

    let mut concepts: Vec<&'static str> = Vec::new();
    for finding in &game_theory.findings {
        if finding.confidence > 0.6 {
            if let Some(ctx) = &finding.game_theory {
                let concept = ctx.concept();
                if !concepts.contains(&concept) {
                    concepts.push(concept);
                }
            }
        }
        if concepts.len() == 3 {
            break;
        }
    }

    if concepts.is_empty() {
        format!(
            "Risk assessment produced {} findings ({} high-confidence) across six categories. \
             No dominant game-theoretic failure mode was identified.",
            total, high_confidence
        )
    } else {
        format!(
            "Risk assessment produced {} findings ({} high-confidence) across six categories. \
             Key game-theoretic concerns: {}.",
            total,
            high_confidence,
            concepts.join(", ")
        )
    }
}

/// Top findings by confidence, rendered as actionable text. Stable sort
/// keeps pooled category order on ties.
fn build_recommendations(pooled: &[&Finding]) -> Vec<String> {
    let mut strong: Vec<&&Finding> = pooled
        .iter()
        .filter(|f| f.confidence > RECOMMENDATION_CONFIDENCE)
        .collect();
    strong.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    strong
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|f| f.mitigation.clone().unwrap_or_else(|| f.title.clone()))
        .collect()
}

/// Every equilibria list attached to a game-theory finding, flattened.
/// `None` (not an empty list) when nothing qualifies, so serialization
/// omits the field entirely.
fn collect_equilibria(game_theory: &RiskCategory) -> Option<Vec<String>> {
    let equilibria: Vec<String> = game_theory
        .findings
        .iter()
        .filter_map(|f| match &f.game_theory {
            Some(GameTheoryContext::NashEquilibrium { equilibria }) => Some(equilibria.clone()),
            _ => None,
        })
        .flatten()
        .collect();

    if equilibria.is_empty() {
        None
    } else {
        Some(equilibria)
    }
}

fn collect_strategies(game_theory: &RiskCategory) -> Option<Vec<String>> {
    let strategies: Vec<String> = game_theory
        .findings
        .iter()
        .filter_map(|f| match &f.game_theory {
            Some(GameTheoryContext::DominantStrategy {
                strategy,
                dominance,
            }) => Some(format!("{strategy} ({dominance})")),
            _ => None,
        })
        .collect();

    if strategies.is_empty() {
        None
    } else {
        Some(strategies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, score: f64, findings: Vec<Finding>) -> RiskCategory {
        RiskCategory::new(name, score, findings)
    }

    fn categories(scores: [f64; 6]) -> RiskCategories {
        RiskCategories {
            economic: category("economic", scores[0], vec![]),
            governance: category("governance", scores[1], vec![]),
            liquidity: category("liquidity", scores[2], vec![]),
            composability: category("composability", scores[3], vec![]),
            mev: category("mev", scores[4], vec![]),
            game_theory: category("gameTheory", scores[5], vec![]),
        }
    }

    #[test]
    fn weights_sum_to_one() {
        let sum = WEIGHT_ECONOMIC
            + WEIGHT_GOVERNANCE
            + WEIGHT_LIQUIDITY
            + WEIGHT_COMPOSABILITY
            + WEIGHT_MEV
            + WEIGHT_GAME_THEORY;
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn overall_score_is_weighted_blend_to_one_decimal() {
        let report = aggregate_report("Test", "0xabc", categories([5.0, 4.0, 6.0, 2.0, 3.0, 8.0]));
        // 1.0 + 0.6 + 1.2 + 0.2 + 0.3 + 2.0 = 5.3
        assert!((report.overall_score - 5.3).abs() < 1e-9);
    }

    #[test]
    fn one_critical_category_forces_critical_overall() {
        let report = aggregate_report("Test", "0xabc", categories([9.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
        // Weighted score is only 1.8, but severity escalates.
        assert!((report.overall_score - 1.8).abs() < 1e-9);
        assert_eq!(report.overall_severity, Severity::Critical);
    }

    #[test]
    fn all_low_categories_stay_low() {
        let report = aggregate_report("Test", "0xabc", categories([0.0, 0.0, 2.0, 0.0, 2.0, 0.0]));
        assert_eq!(report.overall_severity, Severity::Low);
    }

    #[test]
    fn recommendations_capped_and_sorted_by_confidence() {
        let mut cats = categories([5.0; 6]);
        cats.economic.findings = (0..4)
            .map(|i| {
                Finding::new(format!("eco-{i}"), "d", 0.75)
                    .with_mitigation(format!("fix eco-{i}"))
            })
            .collect();
        cats.mev.findings = vec![
            Finding::new("mev-top", "d", 0.95).with_mitigation("fix mev first"),
            Finding::new("mev-weak", "d", 0.5),
        ];
        cats.governance.findings = vec![Finding::new("gov", "d", 0.8)];

        let report = aggregate_report("Test", "0xabc", cats);
        assert_eq!(report.recommendations.len(), 5);
        assert_eq!(report.recommendations[0], "fix mev first");
        // Finding without mitigation falls back to its title.
        assert_eq!(report.recommendations[1], "gov");
        assert!(report.recommendations.iter().all(|r| !r.is_empty()));
    }

    #[test]
    fn insight_fields_absent_without_game_theory_context() {
        let report = aggregate_report("Test", "0xabc", categories([1.0; 6]));
        assert!(report.nash_equilibria.is_none());
        assert!(report.dominant_strategies.is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("nashEquilibria").is_none());
        assert!(json.get("dominantStrategies").is_none());
    }

    #[test]
    fn insight_fields_extracted_from_game_theory_findings() {
        let mut cats = categories([1.0; 6]);
        cats.game_theory.findings = vec![
            Finding::new("bank run", "d", 0.75).with_game_theory(
                GameTheoryContext::NashEquilibrium {
                    equilibria: vec!["stay".into(), "run".into()],
                },
            ),
            Finding::new("farm", "d", 0.8).with_game_theory(GameTheoryContext::DominantStrategy {
                strategy: "dump emissions".into(),
                dominance: "strict".into(),
            }),
        ];

        let report = aggregate_report("Test", "0xabc", cats);
        assert_eq!(
            report.nash_equilibria,
            Some(vec!["stay".to_string(), "run".to_string()])
        );
        assert_eq!(
            report.dominant_strategies,
            Some(vec!["dump emissions (strict)".to_string()])
        );
        assert!(report.summary.contains("Nash equilibrium"));
        assert!(report.summary.contains("dominant strategy"));
    }

    #[test]
    fn summary_counts_high_confidence_findings() {
        let mut cats = categories([1.0; 6]);
        cats.economic.findings = vec![
            Finding::new("a", "d", 0.9),
            Finding::new("b", "d", 0.6),
        ];
        let report = aggregate_report("Test", "0xabc", cats);
        assert!(report.summary.contains("2 findings"));
        assert!(report.summary.contains("(1 high-confidence)"));
    }
}

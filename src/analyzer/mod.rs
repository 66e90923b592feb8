pub mod composability;
pub mod economic;
pub mod game_theory;
pub mod governance;
pub mod liquidity;
pub mod mev;

pub use composability::ComposabilityAnalyzer;
pub use economic::EconomicAnalyzer;
pub use game_theory::GameTheoryAnalyzer;
pub use governance::GovernanceAnalyzer;
pub use liquidity::LiquidityAnalyzer;
pub use mev::MevAnalyzer;

use tracing::debug;

use crate::model::{Finding, ProtocolInput, RiskCategory};

/// One category analyzer. Pure function of the input: missing optional
/// sections degrade to a placeholder finding, never an error.
pub trait CategoryAnalyzer {
    fn name(&self) -> &'static str;
    fn analyze(&self, input: &ProtocolInput) -> RiskCategory;
}

/// A triggered rule: the finding it produced plus its fixed contribution
/// to the category's running score.
pub struct RuleHit {
    pub points: f64,
    pub finding: Finding,
}

impl RuleHit {
    pub fn new(points: f64, finding: Finding) -> Self {
        Self { points, finding }
    }
}

/// One rule check. May hit zero, one, or (for per-pool rules) several
/// times; each hit counts as a contributing check.
pub type RuleCheck = fn(&ProtocolInput) -> Vec<RuleHit>;

/// Data-driven rule table shared by the tally-convention analyzers
/// (economic, governance, liquidity, MEV). Category score is the mean of
/// per-check contributions, clamped to 0-10.
pub struct RuleTable {
    pub category: &'static str,
    pub checks: &'static [RuleCheck],
}

impl RuleTable {
    pub fn evaluate(&self, input: &ProtocolInput) -> RiskCategory {
        let mut total = 0.0;
        let mut findings = Vec::new();

        for check in self.checks {
            for hit in check(input) {
                total += hit.points;
                findings.push(hit.finding);
            }
        }

        let score = if findings.is_empty() {
            0.0
        } else {
            total / findings.len() as f64
        };

        debug!(
            category = self.category,
            score,
            findings = findings.len(),
            "rule table evaluated"
        );

        RiskCategory::new(self.category, score, findings)
    }
}

/// Category stand-in for an entirely absent input section.
pub fn placeholder_category(name: &'static str, score: f64, description: &str) -> RiskCategory {
    let finding = Finding::new(
        format!("Insufficient {} Data", display_name(name)),
        description,
        0.3,
    );
    RiskCategory::new(name, score, vec![finding])
}

fn display_name(category: &str) -> &str {
    match category {
        "economic" => "Economic",
        "governance" => "Governance",
        "liquidity" => "Liquidity",
        "mev" => "MEV",
        "gameTheory" => "Game Theory",
        "composability" => "Composability",
        other => other,
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity tier. Derived from a 0-10 score via fixed breakpoints; the
/// same mapping applies to every category and to the overall report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn from_score(score: f64) -> Self {
        if score < 3.0 {
            Severity::Low
        } else if score < 6.0 {
            Severity::Medium
        } else if score < 8.0 {
            Severity::High
        } else {
            Severity::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_vector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mitigation: Option<String>,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_theory: Option<GameTheoryContext>,
}

impl Finding {
    pub fn new(title: impl Into<String>, description: impl Into<String>, confidence: f64) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            attack_vector: None,
            mitigation: None,
            confidence,
            game_theory: None,
        }
    }

    pub fn with_attack_vector(mut self, vector: impl Into<String>) -> Self {
        self.attack_vector = Some(vector.into());
        self
    }

    pub fn with_mitigation(mut self, mitigation: impl Into<String>) -> Self {
        self.mitigation = Some(mitigation.into());
        self
    }

    pub fn with_game_theory(mut self, context: GameTheoryContext) -> Self {
        self.game_theory = Some(context);
        self
    }
}

/// Game-theoretic annotation attached to a finding. One variant per
/// concept rather than a single bag of optional fields, so the aggregator
/// can extract equilibria and strategies without guessing which fields
/// are populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "concept", rename_all = "camelCase")]
pub enum GameTheoryContext {
    #[serde(rename_all = "camelCase")]
    NashEquilibrium { equilibria: Vec<String> },
    #[serde(rename_all = "camelCase")]
    DominantStrategy { strategy: String, dominance: String },
    #[serde(rename_all = "camelCase")]
    CoordinationGame { focal_point: String },
    #[serde(rename_all = "camelCase")]
    MechanismFlaw { violation: String, fix: String },
    #[serde(rename_all = "camelCase")]
    MultiAgentDynamics { dynamic: String },
}

impl GameTheoryContext {
    /// Human label used in the report summary.
    pub fn concept(&self) -> &'static str {
        match self {
            GameTheoryContext::NashEquilibrium { .. } => "Nash equilibrium",
            GameTheoryContext::DominantStrategy { .. } => "dominant strategy",
            GameTheoryContext::CoordinationGame { .. } => "coordination game",
            GameTheoryContext::MechanismFlaw { .. } => "mechanism design",
            GameTheoryContext::MultiAgentDynamics { .. } => "multi-agent dynamics",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskCategory {
    pub name: String,
    /// 0-10.
    pub score: f64,
    pub severity: Severity,
    pub findings: Vec<Finding>,
}

impl RiskCategory {
    pub fn new(name: impl Into<String>, score: f64, findings: Vec<Finding>) -> Self {
        let score = score.clamp(0.0, 10.0);
        Self {
            name: name.into(),
            score,
            severity: Severity::from_score(score),
            findings,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskCategories {
    pub economic: RiskCategory,
    pub governance: RiskCategory,
    pub liquidity: RiskCategory,
    pub composability: RiskCategory,
    pub mev: RiskCategory,
    pub game_theory: RiskCategory,
}

impl RiskCategories {
    pub fn iter(&self) -> impl Iterator<Item = &RiskCategory> {
        [
            &self.economic,
            &self.governance,
            &self.liquidity,
            &self.mev,
            &self.game_theory,
            &self.composability,
        ]
        .into_iter()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolRiskReport {
    pub protocol: String,
    pub address: String,
    pub timestamp: DateTime<Utc>,
    /// Weighted blend of category scores, rounded to one decimal.
    pub overall_score: f64,
    /// Highest-ranked severity among the categories. Deliberately not
    /// derived from `overall_score`: one critical category must not be
    /// averaged away.
    pub overall_severity: Severity,
    pub categories: RiskCategories,
    pub summary: String,
    /// At most 5 entries, highest-confidence first.
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nash_equilibria: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominant_strategies: Option<Vec<String>>,
}

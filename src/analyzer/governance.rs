use crate::model::{Finding, ProtocolInput, RiskCategory};

use super::{placeholder_category, CategoryAnalyzer, RuleCheck, RuleHit, RuleTable};

/// Governance-parameter risk: quorum floors, timelock windows, and voting
/// power concentration.
pub struct GovernanceAnalyzer;

const CATEGORY: &str = "governance";

const DAY_SECS: f64 = 86_400.0;

static CHECKS: &[RuleCheck] = &[
    check_quorum,
    check_timelock,
    check_voting_power,
    check_proposal_threshold,
];

static TABLE: RuleTable = RuleTable {
    category: CATEGORY,
    checks: CHECKS,
};

impl CategoryAnalyzer for GovernanceAnalyzer {
    fn name(&self) -> &'static str {
        CATEGORY
    }

    fn analyze(&self, input: &ProtocolInput) -> RiskCategory {
        if input.governance.is_none() {
            return placeholder_category(
                CATEGORY,
                0.0,
                "No governance parameters supplied; governance risk could not be assessed.",
            );
        }
        TABLE.evaluate(input)
    }
}

fn check_quorum(input: &ProtocolInput) -> Vec<RuleHit> {
    let Some(quorum) = input.governance.as_ref().and_then(|g| g.quorum) else {
        return vec![];
    };

    if quorum < 0.04 {
        vec![RuleHit::new(
            8.0,
            Finding::new(
                "Critically Low Quorum Threshold",
                format!(
                    "Proposals pass with only {:.1}% of voting power. A small bloc can push \
                     through arbitrary parameter changes.",
                    quorum * 100.0
                ),
                0.9,
            )
            .with_attack_vector("Attacker borrows or accumulates a trivial stake and passes a hostile proposal")
            .with_mitigation("Raise quorum to at least 4% of voting supply"),
        )]
    } else if quorum < 0.10 {
        vec![RuleHit::new(
            4.0,
            Finding::new(
                "Low Quorum Threshold",
                format!(
                    "Quorum of {:.1}% leaves governance decidable by a modest minority.",
                    quorum * 100.0
                ),
                0.7,
            )
            .with_mitigation("Raise quorum or add delegated-voting incentives"),
        )]
    } else {
        vec![]
    }
}

fn check_timelock(input: &ProtocolInput) -> Vec<RuleHit> {
    let Some(delay) = input.governance.as_ref().and_then(|g| g.timelock_delay) else {
        return vec![];
    };

    if delay < DAY_SECS {
        vec![RuleHit::new(
            6.0,
            Finding::new(
                "Short Timelock Delay",
                format!(
                    "Passed proposals execute after only {:.0} hours. Users cannot exit \
                     before a hostile change takes effect.",
                    delay / 3600.0
                ),
                0.85,
            )
            .with_attack_vector("Malicious proposal executes before depositors can withdraw")
            .with_mitigation("Extend the timelock to 24-72 hours"),
        )]
    } else {
        vec![]
    }
}

fn check_voting_power(input: &ProtocolInput) -> Vec<RuleHit> {
    let Some(power) = input
        .governance
        .as_ref()
        .and_then(|g| g.top_holder_voting_power)
    else {
        return vec![];
    };

    if power > 0.5 {
        vec![RuleHit::new(
            9.0,
            Finding::new(
                "Majority Governance Capture",
                format!(
                    "The largest holder controls {:.0}% of voting power and can pass any \
                     proposal unilaterally.",
                    power * 100.0
                ),
                0.9,
            )
            .with_attack_vector("Top holder rewrites protocol parameters in their own favor")
            .with_mitigation("Introduce vote caps, quadratic voting, or delegation dilution"),
        )]
    } else if power > 0.33 {
        vec![RuleHit::new(
            5.0,
            Finding::new(
                "High Voting Power Concentration",
                format!(
                    "The largest holder controls {:.0}% of voting power - enough to veto or \
                     stall most proposals.",
                    power * 100.0
                ),
                0.75,
            )
            .with_mitigation("Encourage delegation to reduce single-holder dominance"),
        )]
    } else {
        vec![]
    }
}

fn check_proposal_threshold(input: &ProtocolInput) -> Vec<RuleHit> {
    let Some(threshold) = input
        .governance
        .as_ref()
        .and_then(|g| g.proposal_threshold)
    else {
        return vec![];
    };

    if threshold > 0.05 {
        vec![RuleHit::new(
            3.0,
            Finding::new(
                "Plutocratic Proposal Gate",
                format!(
                    "Submitting a proposal requires {:.0}% of supply, limiting agenda-setting \
                     to the wealthiest holders.",
                    threshold * 100.0
                ),
                0.6,
            )
            .with_mitigation("Lower the proposal threshold or allow sponsored proposals"),
        )]
    } else {
        vec![]
    }
}

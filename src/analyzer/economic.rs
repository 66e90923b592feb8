use chrono::Utc;

use crate::model::{Finding, ProtocolInput, RiskCategory};

use super::{placeholder_category, CategoryAnalyzer, RuleCheck, RuleHit, RuleTable};

/// Tokenomics and incentive-structure risk: holder concentration,
/// emission dilution, vesting cliffs, and manipulation-prone thin pools.
pub struct EconomicAnalyzer;

const CATEGORY: &str = "economic";

static CHECKS: &[RuleCheck] = &[
    check_concentration,
    check_emission_dilution,
    check_vesting_cliff,
    check_thin_pool_manipulation,
    check_oracle_dependency,
    check_pool_utilization,
];

static TABLE: RuleTable = RuleTable {
    category: CATEGORY,
    checks: CHECKS,
};

impl CategoryAnalyzer for EconomicAnalyzer {
    fn name(&self) -> &'static str {
        CATEGORY
    }

    fn analyze(&self, input: &ProtocolInput) -> RiskCategory {
        if input.tokenomics.is_none() && input.pools().is_empty() {
            return placeholder_category(
                CATEGORY,
                0.0,
                "No tokenomics or pool data supplied; economic risk could not be assessed.",
            );
        }
        TABLE.evaluate(input)
    }
}

fn check_concentration(input: &ProtocolInput) -> Vec<RuleHit> {
    let Some(gini) = input.tokenomics.as_ref().and_then(|t| t.concentration) else {
        return vec![];
    };

    if gini > 0.8 {
        vec![RuleHit::new(
            8.0,
            Finding::new(
                "Extreme Token Concentration",
                format!(
                    "Token holdings are extremely concentrated (Gini {:.2}). A handful of \
                     wallets can move the market or drain incentives at will.",
                    gini
                ),
                0.9,
            )
            .with_attack_vector("Coordinated whale dump or governance takeover by top holders")
            .with_mitigation("Broaden distribution via airdrops, lockups, or emission redirection"),
        )]
    } else if gini > 0.6 {
        vec![RuleHit::new(
            4.0,
            Finding::new(
                "High Token Concentration",
                format!(
                    "Token holdings are significantly concentrated (Gini {:.2}), giving large \
                     holders outsized price and governance influence.",
                    gini
                ),
                0.7,
            )
            .with_mitigation("Monitor top-holder wallets and incentivize wider distribution"),
        )]
    } else {
        vec![]
    }
}

fn check_emission_dilution(input: &ProtocolInput) -> Vec<RuleHit> {
    let Some(t) = input.tokenomics.as_ref() else {
        return vec![];
    };
    let (Some(rate), Some(circulating)) = (t.emission_rate, t.circulating_supply) else {
        return vec![];
    };
    if circulating <= 0.0 {
        return vec![];
    }

    // emission_rate is tokens/hour; annualize over 8760 hours.
    let annual_dilution = rate * 8760.0 / circulating;

    if annual_dilution > 1.0 {
        vec![RuleHit::new(
            9.0,
            Finding::new(
                "Hyperinflationary Emission Schedule",
                format!(
                    "Annualized emissions dilute circulating supply by {:.0}%. Token value \
                     decays faster than fee revenue can plausibly offset.",
                    annual_dilution * 100.0
                ),
                0.85,
            )
            .with_attack_vector("Mercenary capital farms emissions and exits, collapsing the token")
            .with_mitigation("Cut emission rate or gate emissions behind long-term lockups"),
        )]
    } else if annual_dilution > 0.5 {
        vec![RuleHit::new(
            5.0,
            Finding::new(
                "High Token Emission Rate",
                format!(
                    "Annualized emissions dilute circulating supply by {:.0}%, placing sustained \
                     sell pressure on the token.",
                    annual_dilution * 100.0
                ),
                0.7,
            )
            .with_mitigation("Taper the emission schedule toward real-yield funding"),
        )]
    } else {
        vec![]
    }
}

fn check_vesting_cliff(input: &ProtocolInput) -> Vec<RuleHit> {
    let Some(t) = input.tokenomics.as_ref() else {
        return vec![];
    };
    let (Some(schedule), Some(circulating)) = (t.vesting_schedule.as_ref(), t.circulating_supply)
    else {
        return vec![];
    };
    if circulating <= 0.0 {
        return vec![];
    }

    let now = Utc::now().timestamp();
    let window_end = now + 30 * 86_400;

    let cliff = schedule
        .iter()
        .find(|e| e.timestamp >= now && e.timestamp <= window_end && e.amount > 0.1 * circulating);

    match cliff {
        Some(event) => vec![RuleHit::new(
            7.0,
            Finding::new(
                "Imminent Vesting Cliff Unlock",
                format!(
                    "A vesting unlock of {:.0} tokens ({:.0}% of circulating supply) to {} \
                     occurs within 30 days.",
                    event.amount,
                    event.amount / circulating * 100.0,
                    event.recipient
                ),
                0.8,
            )
            .with_attack_vector("Recipient dumps the unlock into thin liquidity")
            .with_mitigation("Negotiate OTC placement or staggered release before the cliff"),
        )],
        None => vec![],
    }
}

fn check_thin_pool_manipulation(input: &ProtocolInput) -> Vec<RuleHit> {
    let thin = input.pools().iter().find(|p| p.liquidity < 100_000.0);

    match thin {
        Some(pool) => vec![RuleHit::new(
            7.0,
            Finding::new(
                "Flash Loan Price Manipulation Exposure",
                format!(
                    "Pool {} holds only ${:.0} of liquidity. A flash loan can move its spot \
                     price cheaply enough to exploit any dependent pricing logic.",
                    pool.address, pool.liquidity
                ),
                0.75,
            )
            .with_attack_vector("Flash-loan swap distorts pool price consumed downstream")
            .with_mitigation("Use TWAP oracles and deepen liquidity on manipulable pools"),
        )],
        None => vec![],
    }
}

// Every scored protocol depends on some external price feed; the question
// is only how exploitable it is, so this check always contributes.
fn check_oracle_dependency(_input: &ProtocolInput) -> Vec<RuleHit> {
    vec![RuleHit::new(
        3.0,
        Finding::new(
            "External Oracle Dependency",
            "Protocol economics depend on external price feeds; stale or manipulated \
             updates propagate directly into its incentives.",
            0.5,
        )
        .with_mitigation("Prefer manipulation-resistant (TWAP/median) oracle constructions"),
    )]
}

fn check_pool_utilization(input: &ProtocolInput) -> Vec<RuleHit> {
    let pools: Vec<_> = input.pools().iter().filter(|p| p.liquidity > 0.0).collect();
    if pools.is_empty() {
        return vec![];
    }

    let avg = pools.iter().map(|p| p.utilization()).sum::<f64>() / pools.len() as f64;

    if avg > 0.9 {
        vec![RuleHit::new(
            6.0,
            Finding::new(
                "Withdrawal Race Conditions",
                format!(
                    "Average pool utilization is {:.0}% of liquidity per day. Under stress, \
                     LPs racing to exit can empty pools before ordinary users withdraw.",
                    avg * 100.0
                ),
                0.65,
            )
            .with_mitigation("Introduce withdrawal queues or utilization-scaled exit fees"),
        )]
    } else {
        vec![]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Pool, Severity, Tokenomics};

    fn input_with_tokenomics(tokenomics: Tokenomics) -> ProtocolInput {
        ProtocolInput {
            address: "0xabc".into(),
            name: "Test".into(),
            tokenomics: Some(tokenomics),
            ..Default::default()
        }
    }

    #[test]
    fn extreme_concentration_scores_eight_points() {
        let input = input_with_tokenomics(Tokenomics {
            concentration: Some(0.9),
            ..Default::default()
        });
        let cat = EconomicAnalyzer.analyze(&input);

        let finding = cat
            .findings
            .iter()
            .find(|f| f.title == "Extreme Token Concentration")
            .expect("concentration finding");
        assert_eq!(finding.confidence, 0.9);
        // Two hits: concentration (+8) and the always-on oracle check (+3).
        assert_eq!(cat.findings.len(), 2);
        assert!((cat.score - 5.5).abs() < 1e-9);
    }

    #[test]
    fn moderate_concentration_uses_lower_tier() {
        let input = input_with_tokenomics(Tokenomics {
            concentration: Some(0.7),
            ..Default::default()
        });
        let cat = EconomicAnalyzer.analyze(&input);
        assert!(cat
            .findings
            .iter()
            .any(|f| f.title == "High Token Concentration"));
        assert!((cat.score - 3.5).abs() < 1e-9); // (4 + 3) / 2
    }

    #[test]
    fn hyperinflation_threshold() {
        // 200 tokens/hour on 1M circulating = 175% annual dilution.
        let input = input_with_tokenomics(Tokenomics {
            emission_rate: Some(200.0),
            circulating_supply: Some(1_000_000.0),
            ..Default::default()
        });
        let cat = EconomicAnalyzer.analyze(&input);
        assert!(cat
            .findings
            .iter()
            .any(|f| f.title == "Hyperinflationary Emission Schedule"));
    }

    #[test]
    fn vesting_cliff_within_window() {
        let input = input_with_tokenomics(Tokenomics {
            circulating_supply: Some(1_000_000.0),
            vesting_schedule: Some(vec![crate::model::VestingEvent {
                timestamp: Utc::now().timestamp() + 7 * 86_400,
                amount: 200_000.0,
                recipient: "team".into(),
            }]),
            ..Default::default()
        });
        let cat = EconomicAnalyzer.analyze(&input);
        assert!(cat
            .findings
            .iter()
            .any(|f| f.title == "Imminent Vesting Cliff Unlock"));
    }

    #[test]
    fn distant_vesting_does_not_fire() {
        let input = input_with_tokenomics(Tokenomics {
            circulating_supply: Some(1_000_000.0),
            vesting_schedule: Some(vec![crate::model::VestingEvent {
                timestamp: Utc::now().timestamp() + 90 * 86_400,
                amount: 500_000.0,
                recipient: "team".into(),
            }]),
            ..Default::default()
        });
        let cat = EconomicAnalyzer.analyze(&input);
        assert!(!cat
            .findings
            .iter()
            .any(|f| f.title == "Imminent Vesting Cliff Unlock"));
    }

    #[test]
    fn missing_everything_yields_placeholder() {
        let input = ProtocolInput {
            address: "0xabc".into(),
            name: "Test".into(),
            ..Default::default()
        };
        let cat = EconomicAnalyzer.analyze(&input);
        assert_eq!(cat.score, 0.0);
        assert_eq!(cat.severity, Severity::Low);
        assert_eq!(cat.findings.len(), 1);
        assert_eq!(cat.findings[0].confidence, 0.3);
    }

    #[test]
    fn thin_pool_flags_flash_loan_risk() {
        let input = ProtocolInput {
            address: "0xabc".into(),
            name: "Test".into(),
            pools: Some(vec![Pool {
                address: "0xpool".into(),
                token0: "ABC".into(),
                token1: "WETH".into(),
                liquidity: 50_000.0,
                volume24h: 10_000.0,
                fees: 0.003,
            }]),
            ..Default::default()
        };
        let cat = EconomicAnalyzer.analyze(&input);
        assert!(cat
            .findings
            .iter()
            .any(|f| f.title == "Flash Loan Price Manipulation Exposure"));
    }
}

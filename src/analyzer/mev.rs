use crate::model::{Finding, Pool, ProtocolInput, RiskCategory};

use super::{placeholder_category, CategoryAnalyzer, RuleCheck, RuleHit, RuleTable};

/// Extractable-value risk: sandwich exposure, JIT liquidity targets, and
/// oracle-update front-running.
pub struct MevAnalyzer;

const CATEGORY: &str = "mev";

static CHECKS: &[RuleCheck] = &[
    check_sandwich_exposure,
    check_jit_targets,
    check_oracle_frontrunning,
];

static TABLE: RuleTable = RuleTable {
    category: CATEGORY,
    checks: CHECKS,
};

impl CategoryAnalyzer for MevAnalyzer {
    fn name(&self) -> &'static str {
        CATEGORY
    }

    fn analyze(&self, input: &ProtocolInput) -> RiskCategory {
        if input.pools().is_empty() {
            return placeholder_category(
                CATEGORY,
                2.0,
                "No pool data supplied; MEV exposure could not be assessed and defaults \
                 to cautious-low.",
            );
        }
        TABLE.evaluate(input)
    }
}

/// A pool where searchers can profitably bracket ordinary swaps.
pub fn is_sandwich_prone(pool: &Pool) -> bool {
    pool.utilization() > 0.5 && pool.liquidity < 500_000.0
}

// Per-pool check: each exposed pool contributes its own hit.
fn check_sandwich_exposure(input: &ProtocolInput) -> Vec<RuleHit> {
    input
        .pools()
        .iter()
        .filter_map(|pool| {
            if is_sandwich_prone(pool) {
                Some(RuleHit::new(
                    7.0,
                    Finding::new(
                        "High Sandwich Attack Exposure",
                        format!(
                            "Pool {} turns over {:.0}% of its ${:.0} liquidity daily. Trades \
                             there are large relative to depth and cheap to bracket.",
                            pool.address,
                            pool.utilization() * 100.0,
                            pool.liquidity
                        ),
                        0.8,
                    )
                    .with_attack_vector("Searcher front-runs and back-runs user swaps for the spread")
                    .with_mitigation("Route through private orderflow or tighten slippage defaults"),
                ))
            } else if pool.utilization() > 0.3 {
                Some(RuleHit::new(
                    4.0,
                    Finding::new(
                        "Moderate Sandwich Attack Exposure",
                        format!(
                            "Pool {} sees {:.0}% daily turnover; larger swaps remain \
                             attractive sandwich targets.",
                            pool.address,
                            pool.utilization() * 100.0
                        ),
                        0.6,
                    )
                    .with_mitigation("Encourage tighter slippage settings for large trades"),
                ))
            } else {
                None
            }
        })
        .collect()
}

fn check_jit_targets(input: &ProtocolInput) -> Vec<RuleHit> {
    input
        .pools()
        .iter()
        .filter_map(|pool| {
            if pool.fees < 0.003 && pool.liquidity > 1_000_000.0 {
                Some(RuleHit::new(
                    5.0,
                    Finding::new(
                        "JIT Liquidity Target",
                        format!(
                            "Pool {} combines deep liquidity (${:.0}) with a {:.2}% fee. \
                             Just-in-time LPs can capture fee income from passive providers.",
                            pool.address,
                            pool.liquidity,
                            pool.fees * 100.0
                        ),
                        0.65,
                    )
                    .with_mitigation("Introduce LP time-weighting or fee-tier adjustments"),
                ))
            } else {
                None
            }
        })
        .collect()
}

// Any pool-bearing protocol leaks information through oracle updates, so
// this check always contributes when pools exist.
fn check_oracle_frontrunning(_input: &ProtocolInput) -> Vec<RuleHit> {
    vec![RuleHit::new(
        3.0,
        Finding::new(
            "Oracle Update Front-Running",
            "Pending oracle updates are visible before they land; searchers can trade \
             ahead of the repricing they cause.",
            0.5,
        )
        .with_mitigation("Use commit-reveal or low-latency oracle feeds"),
    )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Severity;

    fn pool(address: &str, liquidity: f64, volume: f64, fees: f64) -> Pool {
        Pool {
            address: address.into(),
            token0: "ABC".into(),
            token1: "WETH".into(),
            liquidity,
            volume24h: volume,
            fees,
        }
    }

    fn input_with_pools(pools: Vec<Pool>) -> ProtocolInput {
        ProtocolInput {
            address: "0xabc".into(),
            name: "Test".into(),
            pools: Some(pools),
            ..Default::default()
        }
    }

    #[test]
    fn no_pools_yields_cautious_placeholder() {
        let input = ProtocolInput {
            address: "0xabc".into(),
            name: "Test".into(),
            ..Default::default()
        };
        let cat = MevAnalyzer.analyze(&input);
        assert_eq!(cat.score, 2.0);
        assert_eq!(cat.severity, Severity::Low);
    }

    #[test]
    fn high_turnover_thin_pool_is_high_exposure() {
        let input = input_with_pools(vec![pool("0xa", 200_000.0, 150_000.0, 0.003)]);
        let cat = MevAnalyzer.analyze(&input);
        assert!(cat
            .findings
            .iter()
            .any(|f| f.title == "High Sandwich Attack Exposure"));
        // Hits: sandwich (+7) and oracle front-running (+3).
        assert!((cat.score - 5.0).abs() < 1e-9);
    }

    #[test]
    fn deep_pool_downgrades_to_moderate() {
        // 40% turnover but too deep for the high tier.
        let input = input_with_pools(vec![pool("0xa", 1_000_000.0, 400_000.0, 0.003)]);
        let cat = MevAnalyzer.analyze(&input);
        assert!(cat
            .findings
            .iter()
            .any(|f| f.title == "Moderate Sandwich Attack Exposure"));
        assert!(!cat
            .findings
            .iter()
            .any(|f| f.title == "High Sandwich Attack Exposure"));
    }

    #[test]
    fn cheap_deep_pool_is_jit_target() {
        let input = input_with_pools(vec![pool("0xa", 2_000_000.0, 100_000.0, 0.001)]);
        let cat = MevAnalyzer.analyze(&input);
        assert!(cat.findings.iter().any(|f| f.title == "JIT Liquidity Target"));
    }

    #[test]
    fn oracle_frontrunning_always_present_with_pools() {
        let input = input_with_pools(vec![pool("0xa", 5_000_000.0, 100_000.0, 0.003)]);
        let cat = MevAnalyzer.analyze(&input);
        assert!(cat
            .findings
            .iter()
            .any(|f| f.title == "Oracle Update Front-Running"));
    }
}

use crate::model::{Finding, Pool, ProtocolInput, RiskCategory};

use super::{placeholder_category, CategoryAnalyzer, RuleCheck, RuleHit, RuleTable};

/// Liquidity-structure risk: pool concentration, depth relative to TVL,
/// per-pool thinness, LP economics, and impermanent-loss exposure.
pub struct LiquidityAnalyzer;

const CATEGORY: &str = "liquidity";

static CHECKS: &[RuleCheck] = &[
    check_pool_concentration,
    check_tvl_mismatch,
    check_pool_depth,
    check_lp_economics,
    check_il_exposure,
];

static TABLE: RuleTable = RuleTable {
    category: CATEGORY,
    checks: CHECKS,
};

const STABLE_SYMBOLS: &[&str] = &[
    "usdc", "usdt", "dai", "frax", "lusd", "tusd", "usdd", "gusd", "busd", "susd",
];

impl CategoryAnalyzer for LiquidityAnalyzer {
    fn name(&self) -> &'static str {
        CATEGORY
    }

    fn analyze(&self, input: &ProtocolInput) -> RiskCategory {
        if input.pools().is_empty() {
            return placeholder_category(
                CATEGORY,
                2.0,
                "No pool data supplied; liquidity risk could not be assessed and defaults \
                 to cautious-low.",
            );
        }
        TABLE.evaluate(input)
    }
}

fn check_pool_concentration(input: &ProtocolInput) -> Vec<RuleHit> {
    let total = input.total_pool_liquidity();
    if total <= 0.0 {
        return vec![];
    }

    let largest = input
        .pools()
        .iter()
        .map(|p| p.liquidity)
        .fold(0.0_f64, f64::max);
    let share = largest / total;

    if share > 0.8 {
        vec![RuleHit::new(
            7.0,
            Finding::new(
                "Liquidity Concentration Risk",
                format!(
                    "A single pool holds {:.0}% of all protocol liquidity. One venue failing \
                     or draining takes most of the exit liquidity with it.",
                    share * 100.0
                ),
                0.8,
            )
            .with_mitigation("Incentivize liquidity across multiple venues and fee tiers"),
        )]
    } else {
        vec![]
    }
}

fn check_tvl_mismatch(input: &ProtocolInput) -> Vec<RuleHit> {
    let Some(tvl) = input.tvl else {
        return vec![];
    };
    if tvl <= 0.0 {
        return vec![];
    }

    let pool_liquidity = input.total_pool_liquidity();
    if pool_liquidity < 0.1 * tvl {
        vec![RuleHit::new(
            6.0,
            Finding::new(
                "Liquidity/TVL Mismatch",
                format!(
                    "Tradeable pool liquidity (${:.0}) is under 10% of stated TVL (${:.0}). \
                     Most locked value cannot exit without severe slippage.",
                    pool_liquidity, tvl
                ),
                0.7,
            )
            .with_attack_vector("Stress event forces exits through liquidity that cannot absorb them")
            .with_mitigation("Grow pool depth in proportion to TVL or disclose exit constraints"),
        )]
    } else {
        vec![]
    }
}

// Per-pool check: each thin pool is its own contributing hit.
fn check_pool_depth(input: &ProtocolInput) -> Vec<RuleHit> {
    input
        .pools()
        .iter()
        .filter_map(|pool| {
            if pool.liquidity < 10_000.0 {
                Some(RuleHit::new(
                    8.0,
                    Finding::new(
                        "Critically Thin Pool",
                        format!(
                            "Pool {} holds under $10k (${:.0}). Any trade of size moves its \
                             price arbitrarily.",
                            pool.address, pool.liquidity
                        ),
                        0.85,
                    )
                    .with_mitigation("Deprecate or deepen pools below minimum viable depth"),
                ))
            } else if pool.liquidity < 100_000.0 {
                Some(RuleHit::new(
                    4.0,
                    Finding::new(
                        "Low Pool Liquidity",
                        format!(
                            "Pool {} holds ${:.0}, below the $100k depth where routine trades \
                             stop causing outsized slippage.",
                            pool.address, pool.liquidity
                        ),
                        0.65,
                    )
                    .with_mitigation("Concentrate incentives on the thinnest pools"),
                ))
            } else {
                None
            }
        })
        .collect()
}

fn check_lp_economics(input: &ProtocolInput) -> Vec<RuleHit> {
    let total_liquidity = input.total_pool_liquidity();
    if total_liquidity <= 0.0 {
        return vec![];
    }

    let annual_fees: f64 = input
        .pools()
        .iter()
        .map(|p| p.fees * p.volume24h * 365.0)
        .sum();
    let apr = annual_fees / total_liquidity;

    if apr < 0.02 {
        vec![RuleHit::new(
            3.0,
            Finding::new(
                "Unsustainable LP Economics",
                format!(
                    "Fee income annualizes to {:.1}% of pool liquidity. LPs are not being \
                     paid for inventory risk and will leave when incentives dry up.",
                    apr * 100.0
                ),
                0.6,
            )
            .with_mitigation("Adjust fee tiers or route more volume to sustain LP yield"),
        )]
    } else {
        vec![]
    }
}

fn check_il_exposure(input: &ProtocolInput) -> Vec<RuleHit> {
    let pools = input.pools();
    if pools.is_empty() {
        return vec![];
    }

    let volatile = pools.iter().filter(|p| !is_stable_pair(p)).count();
    let share = volatile as f64 / pools.len() as f64;

    if share > 0.7 {
        vec![RuleHit::new(
            5.0,
            Finding::new(
                "High Impermanent Loss Exposure",
                format!(
                    "{:.0}% of pools pair volatile assets. LP positions bleed value against \
                     holding whenever prices diverge.",
                    share * 100.0
                ),
                0.65,
            )
            .with_mitigation("Offer IL protection or weight incentives toward stable pairs"),
        )]
    } else {
        vec![]
    }
}

/// Stable pair only when both sides are a recognized stablecoin.
fn is_stable_pair(pool: &Pool) -> bool {
    is_stable(&pool.token0) && is_stable(&pool.token1)
}

fn is_stable(symbol: &str) -> bool {
    let lower = symbol.to_lowercase();
    STABLE_SYMBOLS.iter().any(|s| lower.contains(s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Severity;

    fn pool(address: &str, token0: &str, token1: &str, liquidity: f64, volume: f64) -> Pool {
        Pool {
            address: address.into(),
            token0: token0.into(),
            token1: token1.into(),
            liquidity,
            volume24h: volume,
            fees: 0.003,
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
        let cat = LiquidityAnalyzer.analyze(&input);
        assert_eq!(cat.score, 2.0);
        assert_eq!(cat.severity, Severity::Low);
        assert_eq!(cat.findings[0].confidence, 0.3);
    }

    #[test]
    fn dominant_pool_flags_concentration() {
        let input = input_with_pools(vec![
            pool("0xbig", "ABC", "WETH", 900_000.0, 200_000.0),
            pool("0xsmall", "ABC", "USDC", 100_000.0, 20_000.0),
        ]);
        let cat = LiquidityAnalyzer.analyze(&input);
        assert!(cat
            .findings
            .iter()
            .any(|f| f.title == "Liquidity Concentration Risk"));
    }

    #[test]
    fn each_thin_pool_is_a_separate_hit() {
        let input = input_with_pools(vec![
            pool("0xa", "ABC", "WETH", 5_000.0, 1_000.0),
            pool("0xb", "ABC", "USDC", 50_000.0, 10_000.0),
        ]);
        let cat = LiquidityAnalyzer.analyze(&input);
        assert!(cat.findings.iter().any(|f| f.title == "Critically Thin Pool"));
        assert!(cat.findings.iter().any(|f| f.title == "Low Pool Liquidity"));
    }

    #[test]
    fn tvl_mismatch_detected() {
        let mut input = input_with_pools(vec![pool("0xa", "ABC", "WETH", 500_000.0, 100_000.0)]);
        input.tvl = Some(50_000_000.0);
        let cat = LiquidityAnalyzer.analyze(&input);
        assert!(cat
            .findings
            .iter()
            .any(|f| f.title == "Liquidity/TVL Mismatch"));
    }

    #[test]
    fn volatile_pairs_flag_il_exposure() {
        let input = input_with_pools(vec![
            pool("0xa", "ABC", "WETH", 500_000.0, 100_000.0),
            pool("0xb", "ABC", "WBTC", 500_000.0, 100_000.0),
            pool("0xc", "USDC", "USDT", 500_000.0, 100_000.0),
        ]);
        let cat = LiquidityAnalyzer.analyze(&input);
        // 2 of 3 pools volatile = 67%, below the 70% threshold.
        assert!(!cat
            .findings
            .iter()
            .any(|f| f.title == "High Impermanent Loss Exposure"));

        let input = input_with_pools(vec![
            pool("0xa", "ABC", "WETH", 500_000.0, 100_000.0),
            pool("0xb", "ABC", "WBTC", 500_000.0, 100_000.0),
        ]);
        let cat = LiquidityAnalyzer.analyze(&input);
        assert!(cat
            .findings
            .iter()
            .any(|f| f.title == "High Impermanent Loss Exposure"));
    }

    #[test]
    fn deep_balanced_pools_stay_quiet() {
        // 0.3% fees on ~20% daily turnover annualizes far above 2% APR.
        let input = input_with_pools(vec![
            pool("0xa", "USDC", "USDT", 5_000_000.0, 1_000_000.0),
            pool("0xb", "DAI", "USDC", 4_000_000.0, 800_000.0),
        ]);
        let cat = LiquidityAnalyzer.analyze(&input);
        assert_eq!(cat.score, 0.0);
        assert!(cat.findings.is_empty());
    }
}

use tracing::debug;

use crate::model::{Finding, ProtocolInput, RiskCategory};

use super::{placeholder_category, CategoryAnalyzer};

/// Cross-protocol dependency risk, classified from the protocol's name and
/// pool structure. Scored as the mean of `confidence * 10` over findings.
pub struct ComposabilityAnalyzer;

const CATEGORY: &str = "composability";

/// Protocol archetype inferred from the name. Ordered substring rules, not
/// dispatch: the classification is literally text matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Archetype {
    YieldAggregator,
    LiquidStaking,
    Derivative,
    Lending,
    Bridge,
}

const NAME_RULES: &[(&str, Archetype)] = &[
    ("yield", Archetype::YieldAggregator),
    ("aggregat", Archetype::YieldAggregator),
    ("vault", Archetype::YieldAggregator),
    ("stak", Archetype::LiquidStaking),
    ("deriv", Archetype::Derivative),
    ("perp", Archetype::Derivative),
    ("synth", Archetype::Derivative),
    ("option", Archetype::Derivative),
    ("lend", Archetype::Lending),
    ("borrow", Archetype::Lending),
    ("loan", Archetype::Lending),
    ("bridge", Archetype::Bridge),
    ("cross-chain", Archetype::Bridge),
];

const WRAPPED_SYMBOLS: &[&str] = &["wbtc", "weth", "wsteth", "wavax", "wmatic", "wbnb", "wsol"];

impl CategoryAnalyzer for ComposabilityAnalyzer {
    fn name(&self) -> &'static str {
        CATEGORY
    }

    fn analyze(&self, input: &ProtocolInput) -> RiskCategory {
        let mut findings = Vec::new();
        let archetypes = classify(&input.name);

        for archetype in &archetypes {
            findings.push(archetype_finding(*archetype));
        }

        if input.tvl.is_some_and(|tvl| tvl > 10_000_000.0) {
            findings.push(
                Finding::new(
                    "Oracle Dependency Surface",
                    "TVL above $10M makes this protocol a meaningful oracle consumer; a bad \
                     upstream price propagates into every integration built on top of it.",
                    0.6,
                )
                .with_mitigation("Document oracle sources and add circuit breakers"),
            );
        }

        if let Some(f) = fragmentation_finding(input) {
            findings.push(f);
        }

        if archetypes.contains(&Archetype::Lending) && input.tvl.is_some_and(|tvl| tvl > 50_000_000.0)
        {
            findings.push(
                Finding::new(
                    "Rehypothecation Risk",
                    "Large lending protocols see their deposit receipts reused as collateral \
                     elsewhere; one bad debt event can unwind several layers of leverage.",
                    0.7,
                )
                .with_attack_vector("Collateral chain unwinds across integrated protocols")
                .with_mitigation("Track receipt-token reuse and cap loop leverage"),
            );
        }

        if !input.pools().is_empty() {
            findings.push(
                Finding::new(
                    "Re-entrancy Economics",
                    "Pool interactions composed within one transaction let integrators \
                     observe and act on intermediate states the protocol never intended \
                     to expose.",
                    0.55,
                )
                .with_mitigation("Enforce checks-effects-interactions and read-only re-entrancy guards"),
            );
        }

        if has_wrapped_asset(input) {
            findings.push(
                Finding::new(
                    "Wrapped Asset Depeg Dependency",
                    "Pools reference wrapped assets whose peg depends on an external bridge \
                     or custodian; a depeg reprices every dependent position at once.",
                    0.6,
                )
                .with_mitigation("Monitor peg deviation and haircut wrapped collateral"),
            );
        }

        if findings.is_empty() {
            return placeholder_category(
                CATEGORY,
                0.0,
                "No composability heuristics matched this protocol's name or structure.",
            );
        }

        let score = findings.iter().map(|f| f.confidence * 10.0).sum::<f64>()
            / findings.len() as f64;
        debug!(category = CATEGORY, score, findings = findings.len(), "scored");
        RiskCategory::new(CATEGORY, score, findings)
    }
}

fn classify(name: &str) -> Vec<Archetype> {
    let lower = name.to_lowercase();
    let mut matched = Vec::new();
    for (needle, archetype) in NAME_RULES {
        if lower.contains(needle) && !matched.contains(archetype) {
            matched.push(*archetype);
        }
    }
    matched
}

fn archetype_finding(archetype: Archetype) -> Finding {
    match archetype {
        Archetype::YieldAggregator => Finding::new(
            "Yield Aggregator Stacking Risk",
            "Yield aggregators inherit the full failure surface of every strategy venue \
             they deposit into.",
            0.7,
        )
        .with_mitigation("Limit per-strategy allocation and audit underlying venues"),
        Archetype::LiquidStaking => Finding::new(
            "Liquid Staking Derivative Risk",
            "Staking receipts trade on secondary markets; validator slashing or exit queues \
             can break their peg to the underlying stake.",
            0.65,
        )
        .with_mitigation("Monitor receipt/underlying spread and validator health"),
        Archetype::Derivative => Finding::new(
            "Derivative Settlement Dependency",
            "Derivative positions settle against external reference prices and margin \
             systems, compounding dependency risk.",
            0.7,
        )
        .with_mitigation("Stress-test settlement under oracle failure scenarios"),
        Archetype::Lending => Finding::new(
            "Lending Market Integration Risk",
            "Lending markets transmit collateral shocks between otherwise unrelated assets \
             through shared liquidation machinery.",
            0.65,
        )
        .with_mitigation("Isolate risky collateral into separate markets"),
        Archetype::Bridge => Finding::new(
            "Bridge Dependency - Maximum Composability Risk",
            "Bridged protocols import the full security assumptions of the bridge; bridge \
             compromise is historically the largest single loss category in DeFi.",
            0.85,
        )
        .with_attack_vector("Bridge validator-set or contract compromise mints unbacked assets")
        .with_mitigation("Limit bridged exposure and prefer canonical messaging layers"),
    }
}

fn fragmentation_finding(input: &ProtocolInput) -> Option<Finding> {
    let pools = input.pools();
    if pools.len() <= 3 {
        return None;
    }
    let mean = input.total_pool_liquidity() / pools.len() as f64;
    let below = pools.iter().filter(|p| p.liquidity < mean / 2.0).count();
    if (below as f64) / (pools.len() as f64) > 0.5 {
        Some(
            Finding::new(
                "Fragmented Liquidity",
                format!(
                    "{} of {} pools hold less than half the mean liquidity. Depth is spread \
                     across venues too thin to be individually useful.",
                    below,
                    pools.len()
                ),
                0.6,
            )
            .with_mitigation("Consolidate incentives onto fewer, deeper pools"),
        )
    } else {
        None
    }
}

fn has_wrapped_asset(input: &ProtocolInput) -> bool {
    input.pools().iter().any(|p| {
        let t0 = p.token0.to_lowercase();
        let t1 = p.token1.to_lowercase();
        WRAPPED_SYMBOLS
            .iter()
            .any(|w| t0.contains(w) || t1.contains(w))
    })
}

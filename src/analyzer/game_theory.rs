use tracing::debug;

use crate::model::{Finding, GameTheoryContext, ProtocolInput, RiskCategory};

use super::{mev::is_sandwich_prone, placeholder_category, CategoryAnalyzer};

/// Strategic-behavior risk: equilibrium structure, dominant strategies,
/// coordination failures, mechanism flaws, and multi-agent dynamics.
///
/// Unlike the tally analyzers this category scores by confidence-weighted
/// severity: each finding's confidence is mapped to a severity weight and
/// the score is the weighted mean over findings.
pub struct GameTheoryAnalyzer;

const CATEGORY: &str = "gameTheory";

const DAY_SECS: f64 = 86_400.0;

impl CategoryAnalyzer for GameTheoryAnalyzer {
    fn name(&self) -> &'static str {
        CATEGORY
    }

    fn analyze(&self, input: &ProtocolInput) -> RiskCategory {
        let mut findings = Vec::new();
        analyze_nash_equilibria(input, &mut findings);
        analyze_dominant_strategies(input, &mut findings);
        analyze_coordination_games(input, &mut findings);
        analyze_mechanism_design(input, &mut findings);
        analyze_multi_agent_dynamics(input, &mut findings);

        if findings.is_empty() {
            return placeholder_category(
                CATEGORY,
                0.0,
                "Input contains too little data for strategic analysis.",
            );
        }

        let score = confidence_weighted_score(&findings);
        debug!(category = CATEGORY, score, findings = findings.len(), "scored");
        RiskCategory::new(CATEGORY, score, findings)
    }
}

/// Map confidence to a severity weight, multiply back by confidence, and
/// average over findings. Capped at 10 by the category constructor.
fn confidence_weighted_score(findings: &[Finding]) -> f64 {
    let total: f64 = findings
        .iter()
        .map(|f| severity_weight(f.confidence) * f.confidence)
        .sum();
    total / findings.len() as f64
}

fn severity_weight(confidence: f64) -> f64 {
    if confidence >= 0.85 {
        10.0
    } else if confidence >= 0.7 {
        7.0
    } else if confidence >= 0.5 {
        4.0
    } else {
        1.0
    }
}

fn analyze_nash_equilibria(input: &ProtocolInput, findings: &mut Vec<Finding>) {
    if let Some(tvl) = input.tvl.filter(|t| *t > 0.0) {
        let pool_liquidity = input.total_pool_liquidity();
        if !input.pools().is_empty() && pool_liquidity / tvl < 0.3 {
            findings.push(
                Finding::new(
                    "Bank Run Equilibrium Structure",
                    format!(
                        "Only {:.0}% of TVL is liquid. Depositors face two stable outcomes: \
                         everyone stays, or everyone rushes the exit and latecomers take the \
                         loss. Any scare can flip the system to the bad equilibrium.",
                        pool_liquidity / tvl * 100.0
                    ),
                    0.75,
                )
                .with_attack_vector("Panic trigger tips depositors into the run equilibrium")
                .with_mitigation("Hold larger liquid reserves or add withdrawal rate limits")
                .with_game_theory(GameTheoryContext::NashEquilibrium {
                    equilibria: vec![
                        "All depositors remain; protocol stays solvent".to_string(),
                        "All depositors exit; last movers absorb the shortfall".to_string(),
                    ],
                }),
            );
        }
    }

    if let Some(gov) = input.governance.as_ref() {
        if let (Some(power), Some(quorum)) = (gov.top_holder_voting_power, gov.quorum) {
            if power > 0.33 && power < 0.5 && quorum > 0.2 {
                findings.push(
                    Finding::new(
                        "Governance Deadlock Equilibrium",
                        format!(
                            "A {:.0}% bloc can veto anything but pass nothing against a {:.0}% \
                             quorum. Mutual blocking is stable and the protocol cannot adapt.",
                            power * 100.0,
                            quorum * 100.0
                        ),
                        0.7,
                    )
                    .with_mitigation("Add deadlock-breaking mechanisms such as decaying quorum")
                    .with_game_theory(GameTheoryContext::NashEquilibrium {
                        equilibria: vec![
                            "Large bloc vetoes all proposals; remaining holders cannot reach quorum"
                                .to_string(),
                        ],
                    }),
                );
            }
        }
    }
}

fn analyze_dominant_strategies(input: &ProtocolInput, findings: &mut Vec<Finding>) {
    if let Some(t) = input.tokenomics.as_ref() {
        if let (Some(rate), Some(circulating)) = (t.emission_rate, t.circulating_supply) {
            if circulating > 0.0 && rate * 24.0 / circulating > 0.01 {
                findings.push(
                    Finding::new(
                        "Farm-and-Dump Dominant Strategy",
                        format!(
                            "Daily emissions dilute supply by {:.1}%. Selling rewards \
                             immediately beats holding no matter what other farmers do, so \
                             rational LPs dump continuously.",
                            rate * 24.0 / circulating * 100.0
                        ),
                        0.8,
                    )
                    .with_mitigation("Vest emissions or pay rewards in non-transferable points")
                    .with_game_theory(GameTheoryContext::DominantStrategy {
                        strategy: "Harvest and immediately sell emissions".to_string(),
                        dominance: "strict".to_string(),
                    }),
                );
            }
        }
    }

    if input.pools().iter().any(is_sandwich_prone) {
        findings.push(
            Finding::new(
                "MEV Extraction Dominant Strategy",
                "At least one pool is thin and busy enough that sandwiching its flow is \
                 profitable regardless of what other searchers do; extraction pressure is \
                 structural, not incidental."
                    .to_string(),
                0.85,
            )
            .with_attack_vector("Competing searchers bid up bribes to bracket user swaps")
            .with_mitigation("Move orderflow to private channels or batch auctions")
            .with_game_theory(GameTheoryContext::DominantStrategy {
                strategy: "Sandwich large swaps in thin pools".to_string(),
                dominance: "strict".to_string(),
            }),
        );
    }
}

fn analyze_coordination_games(input: &ProtocolInput, findings: &mut Vec<Finding>) {
    if let Some(period) = input.governance.as_ref().and_then(|g| g.voting_period) {
        if period < 5.0 * DAY_SECS {
            findings.push(
                Finding::new(
                    "Schelling Point Governance Attack",
                    format!(
                        "A {:.1}-day voting window gives dispersed honest voters too little \
                         time to coordinate, while an organized attacker votes as one bloc.",
                        period / DAY_SECS
                    ),
                    0.6,
                )
                .with_mitigation("Extend voting periods and add proposal alert channels")
                .with_game_theory(GameTheoryContext::CoordinationGame {
                    focal_point: "Attacker bloc votes early; dispersed voters never converge"
                        .to_string(),
                }),
            );
        }
    }

    let thin_pools = input
        .pools()
        .iter()
        .filter(|p| p.liquidity < 100_000.0)
        .count();
    if thin_pools >= 2 {
        findings.push(
            Finding::new(
                "Cross-Venue Oracle Manipulation",
                format!(
                    "{} pools are thin enough to move cheaply. An attacker can shift price on \
                     several venues at once, defeating oracles that median across them.",
                    thin_pools
                ),
                0.7,
            )
            .with_attack_vector("Simultaneous manipulation of multiple thin reference pools")
            .with_mitigation("Weight oracle sources by depth, not venue count")
            .with_game_theory(GameTheoryContext::CoordinationGame {
                focal_point: "Manipulate all thin venues in the same block".to_string(),
            }),
        );
    }
}

fn analyze_mechanism_design(input: &ProtocolInput, findings: &mut Vec<Finding>) {
    if input.governance.is_some() {
        // Token-weighted voting is never fully incentive-compatible;
        // flag it whenever governance exists at all.
        findings.push(
            Finding::new(
                "Strategic Voting Incentives",
                "Token-weighted voting rewards strategic behavior: vote buying, last-minute \
                 swings, and abstention games are all individually rational."
                    .to_string(),
                0.55,
            )
            .with_mitigation("Consider commit-reveal voting or conviction-weighted mechanisms")
            .with_game_theory(GameTheoryContext::MechanismFlaw {
                violation: "Incentive compatibility".to_string(),
                fix: "Commit-reveal ballots with time-locked voting power".to_string(),
            }),
        );
    }

    let total_volume = input.total_pool_volume();
    let fee_revenue: f64 = input.pools().iter().map(|p| p.fees * p.volume24h).sum();
    let mev_leakage = total_volume * 0.005;
    // Zero-fee pools with real volume are the worst case: searchers are
    // paid and LPs are not. With no pools at all both sides are zero and
    // the comparison stays false.
    if mev_leakage > 0.5 * fee_revenue {
        findings.push(
            Finding::new(
                "MEV Leakage Exceeds Fee Budget",
                format!(
                    "Estimated MEV extraction (${:.0}/day) exceeds half of LP fee revenue \
                     (${:.0}/day). The mechanism pays searchers better than the participants \
                     it is meant to reward.",
                    mev_leakage, fee_revenue
                ),
                0.75,
            )
            .with_mitigation("Recapture MEV via auctions or protocol-owned orderflow")
            .with_game_theory(GameTheoryContext::MechanismFlaw {
                violation: "Budget balance".to_string(),
                fix: "MEV recapture auction returning proceeds to LPs".to_string(),
            }),
        );
    }
}

fn analyze_multi_agent_dynamics(input: &ProtocolInput, findings: &mut Vec<Finding>) {
    if let Some(tvl) = input.tvl.filter(|t| *t > 0.0) {
        if !input.pools().is_empty() && input.total_pool_liquidity() / tvl < 0.2 {
            findings.push(
                Finding::new(
                    "Liquidation Cascade Dynamics",
                    "Liquid depth is far below locked value; forced selling from one \
                     liquidation moves prices enough to trigger the next, and the feedback \
                     loop accelerates."
                        .to_string(),
                    0.7,
                )
                .with_mitigation("Cap position sizes relative to liquid depth")
                .with_game_theory(GameTheoryContext::MultiAgentDynamics {
                    dynamic: "Self-reinforcing liquidation spiral".to_string(),
                }),
            );
        }
    }

    if input.pools().iter().any(|p| p.volume24h > 100_000.0) {
        findings.push(
            Finding::new(
                "Front-Running Arms Race",
                "Pools with six-figure daily flow attract competing searchers whose bidding \
                 escalates until most extractable value goes to block producers."
                    .to_string(),
                0.6,
            )
            .with_game_theory(GameTheoryContext::MultiAgentDynamics {
                dynamic: "Escalating priority-fee competition among searchers".to_string(),
            }),
        );
    }

    if let Some(delay) = input.governance.as_ref().and_then(|g| g.timelock_delay) {
        if delay < 2.0 * DAY_SECS {
            findings.push(
                Finding::new(
                    "Information Asymmetry Window",
                    format!(
                        "A {:.0}-hour timelock lets insiders who followed the proposal act on \
                         its outcome while ordinary users are still unaware.",
                        delay / 3600.0
                    ),
                    0.65,
                )
                .with_mitigation("Lengthen the timelock and broadcast execution schedules")
                .with_game_theory(GameTheoryContext::MultiAgentDynamics {
                    dynamic: "Insiders front-run parameter changes on unequal information"
                        .to_string(),
                }),
            );
        }
    }
}

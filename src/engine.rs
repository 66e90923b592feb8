use tracing::{debug, info};

use crate::aggregator::aggregate_report;
use crate::analyzer::{
    CategoryAnalyzer, ComposabilityAnalyzer, EconomicAnalyzer, GameTheoryAnalyzer,
    GovernanceAnalyzer, LiquidityAnalyzer, MevAnalyzer,
};
use crate::error::{Result, RiskSeerError};
use crate::model::{ProtocolInput, ProtocolRiskReport, RiskCategories};

/// Score a protocol description against the full rule catalog.
///
/// The single entry point of the engine. Rejects inputs missing the
/// required identifiers; everything else degrades gracefully inside the
/// analyzers. The six analyzers are independent pure functions and run
/// sequentially - there is nothing to suspend on or share between them.
pub fn score_protocol(input: &ProtocolInput) -> Result<ProtocolRiskReport> {
    validate(input)?;

    info!(protocol = %input.name, address = %input.address, "scoring protocol");

    let categories = RiskCategories {
        economic: EconomicAnalyzer.analyze(input),
        governance: GovernanceAnalyzer.analyze(input),
        liquidity: LiquidityAnalyzer.analyze(input),
        composability: ComposabilityAnalyzer.analyze(input),
        mev: MevAnalyzer.analyze(input),
        game_theory: GameTheoryAnalyzer.analyze(input),
    };

    for category in categories.iter() {
        debug!(
            category = %category.name,
            score = category.score,
            severity = %category.severity,
            "category result"
        );
    }

    let report = aggregate_report(&input.name, &input.address, categories);

    info!(
        protocol = %input.name,
        overall_score = report.overall_score,
        severity = %report.overall_severity,
        "scoring complete"
    );

    Ok(report)
}

/// Blank identifiers are treated as missing: typed input cannot represent
/// an absent `String` field any other way.
fn validate(input: &ProtocolInput) -> Result<()> {
    if input.address.trim().is_empty() {
        return Err(RiskSeerError::MissingRequiredField("address"));
    }
    if input.name.trim().is_empty() {
        return Err(RiskSeerError::MissingRequiredField("name"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_address_is_rejected() {
        let input = ProtocolInput {
            address: "  ".into(),
            name: "Test".into(),
            ..Default::default()
        };
        let err = score_protocol(&input).unwrap_err();
        assert!(matches!(err, RiskSeerError::MissingRequiredField("address")));
    }

    #[test]
    fn missing_name_is_rejected() {
        let input = ProtocolInput {
            address: "0xabc".into(),
            name: String::new(),
            ..Default::default()
        };
        let err = score_protocol(&input).unwrap_err();
        assert!(matches!(err, RiskSeerError::MissingRequiredField("name")));
    }
}

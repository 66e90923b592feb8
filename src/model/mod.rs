pub mod input;
pub mod report;

pub use input::{Governance, Pool, ProtocolInput, Tokenomics, VestingEvent};
pub use report::{
    Finding, GameTheoryContext, ProtocolRiskReport, RiskCategories, RiskCategory, Severity,
};

use serde::{Deserialize, Serialize};

/// Caller-supplied description of a protocol. Only `address` and `name`
/// are required; every other section is best-effort data from whatever
/// upstream fetcher the caller ran (or none at all).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolInput {
    pub address: String,
    pub name: String,
    /// Total value locked, USD.
    #[serde(default)]
    pub tvl: Option<f64>,
    #[serde(default)]
    pub tokenomics: Option<Tokenomics>,
    #[serde(default)]
    pub governance: Option<Governance>,
    #[serde(default)]
    pub pools: Option<Vec<Pool>>,
}

impl ProtocolInput {
    /// Pools slice regardless of whether the section was supplied.
    pub fn pools(&self) -> &[Pool] {
        self.pools.as_deref().unwrap_or(&[])
    }

    pub fn total_pool_liquidity(&self) -> f64 {
        self.pools().iter().map(|p| p.liquidity).sum()
    }

    pub fn total_pool_volume(&self) -> f64 {
        self.pools().iter().map(|p| p.volume24h).sum()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tokenomics {
    #[serde(default)]
    pub total_supply: Option<f64>,
    #[serde(default)]
    pub circulating_supply: Option<f64>,
    /// Tokens emitted per hour.
    #[serde(default)]
    pub emission_rate: Option<f64>,
    /// Gini coefficient of holder concentration, 0 (equal) to 1.
    #[serde(default)]
    pub concentration: Option<f64>,
    #[serde(default)]
    pub vesting_schedule: Option<Vec<VestingEvent>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VestingEvent {
    /// Unlock time, unix seconds.
    pub timestamp: i64,
    pub amount: f64,
    pub recipient: String,
}

/// Governance parameters. Fields the fetcher could not determine are left
/// out and the rules that read them simply do not fire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Governance {
    /// Fraction of voting power required for a valid proposal, 0-1.
    #[serde(default)]
    pub quorum: Option<f64>,
    /// Seconds.
    #[serde(default)]
    pub voting_period: Option<f64>,
    /// Seconds between a proposal passing and execution.
    #[serde(default)]
    pub timelock_delay: Option<f64>,
    /// Fraction of supply needed to submit a proposal, 0-1.
    #[serde(default)]
    pub proposal_threshold: Option<f64>,
    /// Voting power share of the single largest holder, 0-1.
    #[serde(default)]
    pub top_holder_voting_power: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub address: String,
    pub token0: String,
    pub token1: String,
    /// USD.
    #[serde(default)]
    pub liquidity: f64,
    /// USD traded over the last 24h.
    #[serde(default)]
    pub volume24h: f64,
    /// LP fee as a fraction (0.003 = 30 bps).
    #[serde(default)]
    pub fees: f64,
}

impl Pool {
    /// 24h volume relative to pool depth. Zero-liquidity pools report zero
    /// utilization rather than a division blowup.
    pub fn utilization(&self) -> f64 {
        if self.liquidity > 0.0 {
            self.volume24h / self.liquidity
        } else {
            0.0
        }
    }
}

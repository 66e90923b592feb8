//! Heuristic risk scoring for DeFi protocols.
//!
//! The engine takes a caller-supplied [`model::ProtocolInput`] describing a
//! protocol's tokenomics, governance parameters, and liquidity pools, runs
//! six independent category analyzers over it, and blends the results into
//! a single [`model::ProtocolRiskReport`]. All scoring is deterministic
//! threshold evaluation; there is no I/O and no on-chain access inside the
//! engine.

pub mod aggregator;
pub mod analyzer;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod monitoring;

pub use engine::score_protocol;
pub use error::{Result, RiskSeerError};
pub use model::{ProtocolInput, ProtocolRiskReport};

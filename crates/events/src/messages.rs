use chrono::{DateTime, Utc};
use core_types::{AlgoId, AlgoKind, AlgoStatus, Offset, OrderSide};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Policy-specific display data, built explicitly by each policy rather
/// than discovered through reflection. `parameters` are fixed at creation;
/// `variables` evolve as the policy runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyReport {
    pub parameters: Value,
    pub variables: Value,
}

/// A complete snapshot of one algorithm instance, published on every state
/// change for consumption by any monitoring front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgoSnapshot {
    pub algo_id: AlgoId,
    pub kind: AlgoKind,
    pub symbol: String,
    pub side: OrderSide,
    pub offset: Offset,
    pub price: Decimal,
    pub volume: Decimal,
    pub status: AlgoStatus,
    /// Cumulative traded quantity across all child orders.
    pub traded: Decimal,
    /// Quantity still to execute.
    pub remaining: Decimal,
    /// Volume-weighted average fill price; zero until the first fill.
    pub traded_price: Decimal,
    pub parameters: Value,
    pub variables: Value,
    pub timestamp: DateTime<Utc>,
}

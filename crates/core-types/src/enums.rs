use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Open/close intent of an order: whether it enters a new position or
/// reduces an existing one. `None` is used by policies that manage a
/// standalone position of their own (grid, arbitrage legs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Offset {
    None,
    Open,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    Limit,
}

/// Venue-side status of a child order, as reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Submitting,
    NotTraded,
    PartTraded,
    AllTraded,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    /// An order is active while it can still produce fills.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            OrderStatus::Submitting | OrderStatus::NotTraded | OrderStatus::PartTraded
        )
    }
}

/// Lifecycle state of one execution-algorithm instance.
///
/// `Paused` is the initial state; `Stopped` (explicit user cancel) and
/// `Finished` (target filled, or the policy terminated itself) are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlgoStatus {
    Paused,
    Running,
    Stopped,
    Finished,
}

impl AlgoStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AlgoStatus::Stopped | AlgoStatus::Finished)
    }
}

/// The closed set of slicing policies shipped with the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlgoKind {
    Twap,
    Iceberg,
    Sniper,
    Stop,
    BestLimit,
    Grid,
    Arbitrage,
}

impl AlgoKind {
    /// Every available policy, in display order.
    pub fn all() -> &'static [AlgoKind] {
        &[
            AlgoKind::Twap,
            AlgoKind::Iceberg,
            AlgoKind::Sniper,
            AlgoKind::Stop,
            AlgoKind::BestLimit,
            AlgoKind::Grid,
            AlgoKind::Arbitrage,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlgoKind::Twap => "Twap",
            AlgoKind::Iceberg => "Iceberg",
            AlgoKind::Sniper => "Sniper",
            AlgoKind::Stop => "Stop",
            AlgoKind::BestLimit => "BestLimit",
            AlgoKind::Grid => "Grid",
            AlgoKind::Arbitrage => "Arbitrage",
        }
    }
}

impl fmt::Display for AlgoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

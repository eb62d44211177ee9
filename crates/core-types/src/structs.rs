use crate::enums::{Offset, OrderSide, OrderStatus, OrderType};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Venue-assigned identifier of a child order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Engine-assigned identifier of an algorithm instance, stable for the
/// instance's lifetime (e.g. "Twap_3").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlgoId(pub String);

impl fmt::Display for AlgoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static contract metadata supplied by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractData {
    pub symbol: String,
    /// Minimum tradable quantity increment. Order quantities are rounded
    /// down to a multiple of this before being sent to the venue.
    pub min_volume: Decimal,
    /// Minimum price increment.
    pub price_tick: Decimal,
}

/// A read-only market data snapshot for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickData {
    pub symbol: String,
    pub last_price: Decimal,
    pub bid_price: Decimal,
    pub bid_volume: Decimal,
    pub ask_price: Decimal,
    pub ask_volume: Decimal,
    /// Daily limit-up price, if the venue enforces one.
    pub limit_up: Option<Decimal>,
    /// Daily limit-down price, if the venue enforces one.
    pub limit_down: Option<Decimal>,
    pub timestamp: DateTime<Utc>,
}

/// A request to place one child order, produced by the engine on behalf of
/// an algorithm instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub offset: Offset,
    pub order_type: OrderType,
    pub price: Decimal,
    pub volume: Decimal,
    /// Tags the request with the owning instance, for venue-side audit.
    pub reference: String,
}

/// Status update for a child order, delivered by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderData {
    pub order_id: OrderId,
    pub symbol: String,
    pub side: OrderSide,
    pub offset: Offset,
    pub price: Decimal,
    pub volume: Decimal,
    /// Quantity filled so far on this order.
    pub traded: Decimal,
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
}

impl OrderData {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// A fill on a child order, delivered by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeData {
    pub trade_id: String,
    pub order_id: OrderId,
    pub symbol: String,
    pub side: OrderSide,
    pub offset: Offset,
    pub price: Decimal,
    pub volume: Decimal,
    pub timestamp: DateTime<Utc>,
}

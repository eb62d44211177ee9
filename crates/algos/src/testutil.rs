//! Shared fixtures for the in-crate unit tests.

use crate::context::AlgoServices;
use chrono::Utc;
use core_types::{
    AlgoId, ContractData, Offset, OrderData, OrderId, OrderRequest, OrderSide, OrderStatus,
    TickData, TradeData,
};
use events::AlgoSnapshot;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

/// Records every order action a policy takes, without any engine or
/// gateway behind it.
pub struct MockServices {
    pub contracts: HashMap<String, ContractData>,
    pub ticks: HashMap<String, TickData>,
    pub sent: Vec<(AlgoId, OrderRequest)>,
    pub cancelled: Vec<OrderId>,
    pub snapshots: Vec<AlgoSnapshot>,
    next_id: u64,
}

impl MockServices {
    pub fn new() -> Self {
        Self {
            contracts: HashMap::new(),
            ticks: HashMap::new(),
            sent: Vec::new(),
            cancelled: Vec::new(),
            snapshots: Vec::new(),
            next_id: 0,
        }
    }

    pub fn with_contract(symbol: &str, min_volume: Decimal) -> Self {
        let mut services = Self::new();
        services.contracts.insert(
            symbol.to_string(),
            ContractData {
                symbol: symbol.to_string(),
                min_volume,
                price_tick: dec!(0.2),
            },
        );
        services
    }

    pub fn set_tick(&mut self, tick: TickData) {
        self.ticks.insert(tick.symbol.clone(), tick);
    }

    /// The last order request sent, if any.
    pub fn last_sent(&self) -> Option<&OrderRequest> {
        self.sent.last().map(|(_, req)| req)
    }
}

impl AlgoServices for MockServices {
    fn send_order(&mut self, algo_id: &AlgoId, req: OrderRequest) -> Option<OrderId> {
        self.next_id += 1;
        let order_id = OrderId(format!("M.{}", self.next_id));
        self.sent.push((algo_id.clone(), req));
        Some(order_id)
    }

    fn cancel_order(&mut self, _algo_id: &AlgoId, order_id: &OrderId) {
        self.cancelled.push(order_id.clone());
    }

    fn get_tick(&self, symbol: &str) -> Option<TickData> {
        self.ticks.get(symbol).cloned()
    }

    fn get_contract(&self, symbol: &str) -> Option<ContractData> {
        self.contracts.get(symbol).cloned()
    }

    fn publish(&mut self, snapshot: AlgoSnapshot) {
        self.snapshots.push(snapshot);
    }
}

pub fn tick(symbol: &str, last: Decimal, bid: Decimal, ask: Decimal) -> TickData {
    tick_sized(symbol, last, bid, dec!(10), ask, dec!(10))
}

pub fn tick_sized(
    symbol: &str,
    last: Decimal,
    bid: Decimal,
    bid_volume: Decimal,
    ask: Decimal,
    ask_volume: Decimal,
) -> TickData {
    TickData {
        symbol: symbol.to_string(),
        last_price: last,
        bid_price: bid,
        bid_volume,
        ask_price: ask,
        ask_volume,
        limit_up: None,
        limit_down: None,
        timestamp: Utc::now(),
    }
}

pub fn order_update(order_id: &str, status: OrderStatus) -> OrderData {
    order_update_for("IF2301", order_id, status)
}

pub fn order_update_for(symbol: &str, order_id: &str, status: OrderStatus) -> OrderData {
    OrderData {
        order_id: OrderId(order_id.to_string()),
        symbol: symbol.to_string(),
        side: OrderSide::Buy,
        offset: Offset::Open,
        price: dec!(100),
        volume: dec!(5),
        traded: Decimal::ZERO,
        status,
        timestamp: Utc::now(),
    }
}

pub fn trade(
    trade_id: &str,
    order_id: &str,
    side: OrderSide,
    price: Decimal,
    volume: Decimal,
) -> TradeData {
    trade_for("IF2301", trade_id, order_id, side, price, volume)
}

pub fn trade_for(
    symbol: &str,
    trade_id: &str,
    order_id: &str,
    side: OrderSide,
    price: Decimal,
    volume: Decimal,
) -> TradeData {
    TradeData {
        trade_id: trade_id.to_string(),
        order_id: OrderId(order_id.to_string()),
        symbol: symbol.to_string(),
        side,
        offset: Offset::None,
        price,
        volume,
        timestamp: Utc::now(),
    }
}

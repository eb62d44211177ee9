use crate::{ExecutionGateway, GatewayError};
use chrono::Utc;
use core_types::{
    ContractData, OrderData, OrderId, OrderRequest, OrderStatus, TickData, TradeData,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

/// An in-memory paper venue.
///
/// `SimGateway` accepts every well-formed order, assigns ids, and keeps a
/// book of live orders, but performs no matching on its own. The driver
/// (demo binary or test) decides when orders fill or cancel by calling
/// [`SimGateway::fill_order`] and draining [`SimGateway::take_updates`] /
/// [`SimGateway::take_trades`] back into the engine, which keeps event
/// timing fully deterministic.
pub struct SimGateway {
    contracts: HashMap<String, ContractData>,
    ticks: HashMap<String, TickData>,
    subscriptions: Vec<String>,
    book: HashMap<OrderId, OrderData>,
    sent: Vec<OrderRequest>,
    cancels: Vec<OrderId>,
    pending_updates: Vec<OrderData>,
    pending_trades: Vec<TradeData>,
    next_order: u64,
    next_trade: u64,
}

impl SimGateway {
    pub fn new() -> Self {
        Self {
            contracts: HashMap::new(),
            ticks: HashMap::new(),
            subscriptions: Vec::new(),
            book: HashMap::new(),
            sent: Vec::new(),
            cancels: Vec::new(),
            pending_updates: Vec::new(),
            pending_trades: Vec::new(),
            next_order: 0,
            next_trade: 0,
        }
    }

    /// Registers a tradable contract.
    pub fn set_contract(&mut self, contract: ContractData) {
        self.contracts.insert(contract.symbol.clone(), contract);
    }

    /// Stores the latest tick for `get_tick` lookups. The driver is
    /// responsible for also routing the tick into the engine.
    pub fn push_tick(&mut self, tick: TickData) {
        self.ticks.insert(tick.symbol.clone(), tick);
    }

    /// Every order request accepted so far, in send order.
    pub fn sent_requests(&self) -> &[OrderRequest] {
        &self.sent
    }

    /// Every `subscribe` call received, in call order, duplicates included.
    pub fn subscriptions(&self) -> &[String] {
        &self.subscriptions
    }

    /// Every cancel requested so far.
    pub fn cancel_requests(&self) -> &[OrderId] {
        &self.cancels
    }

    /// Ids of orders still active in the book.
    pub fn open_order_ids(&self) -> Vec<OrderId> {
        let mut ids: Vec<OrderId> = self
            .book
            .values()
            .filter(|o| o.is_active())
            .map(|o| o.order_id.clone())
            .collect();
        ids.sort_by(|a, b| a.0.cmp(&b.0));
        ids
    }

    /// Fully fills an active order at its own limit price, queueing the
    /// resulting order update and trade for the driver to route.
    pub fn fill_order(&mut self, order_id: &OrderId) -> bool {
        let Some(order) = self.book.get_mut(order_id) else {
            return false;
        };
        if !order.is_active() {
            return false;
        }

        order.traded = order.volume;
        order.status = OrderStatus::AllTraded;

        self.next_trade += 1;
        let trade = TradeData {
            trade_id: format!("SIMT.{}", self.next_trade),
            order_id: order.order_id.clone(),
            symbol: order.symbol.clone(),
            side: order.side,
            offset: order.offset,
            price: order.price,
            volume: order.volume,
            timestamp: Utc::now(),
        };

        self.pending_updates.push(order.clone());
        self.pending_trades.push(trade);
        true
    }

    /// Drains queued order updates (fills and cancel confirmations).
    pub fn take_updates(&mut self) -> Vec<OrderData> {
        std::mem::take(&mut self.pending_updates)
    }

    /// Drains queued trades.
    pub fn take_trades(&mut self) -> Vec<TradeData> {
        std::mem::take(&mut self.pending_trades)
    }
}

impl Default for SimGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionGateway for SimGateway {
    fn get_contract(&self, symbol: &str) -> Option<ContractData> {
        self.contracts.get(symbol).cloned()
    }

    fn get_tick(&self, symbol: &str) -> Option<TickData> {
        self.ticks.get(symbol).cloned()
    }

    fn get_order(&self, order_id: &OrderId) -> Option<OrderData> {
        self.book.get(order_id).cloned()
    }

    fn subscribe(&mut self, symbol: &str) {
        // Every call is recorded so tests can assert how often the engine
        // actually asked.
        self.subscriptions.push(symbol.to_string());
    }

    fn send_order(&mut self, req: &OrderRequest) -> Result<OrderId, GatewayError> {
        if !self.contracts.contains_key(&req.symbol) {
            return Err(GatewayError::Rejected(format!(
                "unknown contract {}",
                req.symbol
            )));
        }
        if req.volume <= Decimal::ZERO {
            return Err(GatewayError::Rejected("non-positive volume".to_string()));
        }

        self.next_order += 1;
        let order_id = OrderId(format!("SIM.{}", self.next_order));
        let order = OrderData {
            order_id: order_id.clone(),
            symbol: req.symbol.clone(),
            side: req.side,
            offset: req.offset,
            price: req.price,
            volume: req.volume,
            traded: Decimal::ZERO,
            status: OrderStatus::NotTraded,
            timestamp: Utc::now(),
        };
        debug!(order = %order_id, symbol = %req.symbol, "sim order accepted");

        // Queue the acceptance ack the way a live venue would.
        self.pending_updates.push(order.clone());
        self.book.insert(order_id.clone(), order);
        self.sent.push(req.clone());
        Ok(order_id)
    }

    fn cancel_order(&mut self, order_id: &OrderId) {
        self.cancels.push(order_id.clone());
        if let Some(order) = self.book.get_mut(order_id) {
            if order.is_active() {
                order.status = OrderStatus::Cancelled;
                self.pending_updates.push(order.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Offset, OrderSide, OrderType};
    use rust_decimal_macros::dec;

    fn contract() -> ContractData {
        ContractData {
            symbol: "IF2301".to_string(),
            min_volume: dec!(1),
            price_tick: dec!(0.2),
        }
    }

    fn request(volume: Decimal) -> OrderRequest {
        OrderRequest {
            symbol: "IF2301".to_string(),
            side: OrderSide::Buy,
            offset: Offset::Open,
            order_type: OrderType::Limit,
            price: dec!(4000),
            volume,
            reference: "test".to_string(),
        }
    }

    #[test]
    fn rejects_unknown_contract_and_bad_volume() {
        let mut gw = SimGateway::new();
        assert!(gw.send_order(&request(dec!(1))).is_err());

        gw.set_contract(contract());
        assert!(gw.send_order(&request(Decimal::ZERO)).is_err());
        assert!(gw.send_order(&request(dec!(1))).is_ok());
    }

    #[test]
    fn fill_queues_update_and_trade() {
        let mut gw = SimGateway::new();
        gw.set_contract(contract());
        let id = gw.send_order(&request(dec!(3))).unwrap();

        assert!(gw.fill_order(&id));
        // A filled order cannot fill twice.
        assert!(!gw.fill_order(&id));

        // Acceptance ack plus the fill.
        let updates = gw.take_updates();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].status, OrderStatus::NotTraded);
        assert_eq!(updates[1].status, OrderStatus::AllTraded);

        let trades = gw.take_trades();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].volume, dec!(3));
    }

    #[test]
    fn cancel_confirms_once() {
        let mut gw = SimGateway::new();
        gw.set_contract(contract());
        let id = gw.send_order(&request(dec!(2))).unwrap();

        gw.cancel_order(&id);
        gw.cancel_order(&id);

        assert_eq!(gw.cancel_requests().len(), 2);
        // Acceptance ack, then exactly one cancel confirmation.
        let updates = gw.take_updates();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[1].status, OrderStatus::Cancelled);
        assert!(gw.open_order_ids().is_empty());
    }
}

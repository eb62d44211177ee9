use crate::context::{AlgoContext, AlgoServices};
use crate::AlgoPolicy;
use chrono::Utc;
use core_types::{
    AlgoId, AlgoKind, AlgoStatus, Offset, OrderData, OrderId, OrderSide, TickData, TradeData,
};
use events::AlgoSnapshot;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::info;

/// Immutable parameters of the parent order, fixed at creation.
#[derive(Debug, Clone)]
pub struct AlgoParams {
    pub symbol: String,
    pub side: OrderSide,
    pub offset: Offset,
    /// Limit price (or trigger/center price, depending on the policy).
    pub price: Decimal,
    /// Total target quantity.
    pub volume: Decimal,
}

/// The mutable bookkeeping shared by every policy: lifecycle status,
/// accumulated fills, and the set of currently open child orders.
#[derive(Debug)]
pub struct ExecState {
    pub id: AlgoId,
    pub kind: AlgoKind,
    pub params: AlgoParams,
    pub status: AlgoStatus,
    /// Cumulative traded quantity across all child orders.
    pub traded: Decimal,
    /// Volume-weighted average fill price; zero until the first fill.
    pub traded_price: Decimal,
    /// Child orders whose last reported status was active, keyed by id.
    pub active_orders: HashMap<OrderId, OrderData>,
}

impl ExecState {
    fn new(id: AlgoId, kind: AlgoKind, params: AlgoParams) -> Self {
        Self {
            id,
            kind,
            params,
            status: AlgoStatus::Paused,
            traded: Decimal::ZERO,
            traded_price: Decimal::ZERO,
            active_orders: HashMap::new(),
        }
    }

    /// Quantity still to execute, never negative.
    pub fn remaining(&self) -> Decimal {
        (self.params.volume - self.traded).max(Decimal::ZERO)
    }

    /// Applies an order status update to the open-order set: active orders
    /// are recorded or overwritten, inactive ones removed. Removal is
    /// idempotent, so duplicate terminal updates are harmless.
    pub fn record_order(&mut self, order: &OrderData) {
        if order.is_active() {
            self.active_orders.insert(order.order_id.clone(), order.clone());
        } else {
            self.active_orders.remove(&order.order_id);
        }
    }

    /// Accumulates a fill into the traded quantity and the volume-weighted
    /// average price. Applied unconditionally: a fill may arrive for an
    /// order placed before a pause or stop.
    pub fn record_trade(&mut self, trade: &TradeData) {
        let cost = self.traded_price * self.traded + trade.price * trade.volume;
        self.traded += trade.volume;
        if self.traded > Decimal::ZERO {
            self.traded_price = cost / self.traded;
        }
    }

    /// Issues a cancel for every open child order. No-op when none are open.
    pub fn cancel_all(&mut self, services: &mut dyn AlgoServices) {
        for order_id in self.active_orders.keys().cloned().collect::<Vec<_>>() {
            services.cancel_order(&self.id, &order_id);
        }
    }
}

/// One running (or terminated) execution task: the shared state machine
/// bound to its slicing policy.
pub struct AlgoInstance {
    exec: ExecState,
    policy: Box<dyn AlgoPolicy>,
}

impl AlgoInstance {
    pub fn new(id: AlgoId, kind: AlgoKind, params: AlgoParams, policy: Box<dyn AlgoPolicy>) -> Self {
        Self {
            exec: ExecState::new(id, kind, params),
            policy,
        }
    }

    pub fn id(&self) -> &AlgoId {
        &self.exec.id
    }

    pub fn status(&self) -> AlgoStatus {
        self.exec.status
    }

    pub fn exec(&self) -> &ExecState {
        &self.exec
    }

    /// Symbols beyond the instance's own that need market data routed here.
    pub fn extra_subscriptions(&self) -> Vec<String> {
        self.policy.extra_subscriptions()
    }

    /// Builds the full monitoring snapshot for this instance.
    pub fn snapshot(&self) -> AlgoSnapshot {
        let report = self.policy.report();
        AlgoSnapshot {
            algo_id: self.exec.id.clone(),
            kind: self.exec.kind,
            symbol: self.exec.params.symbol.clone(),
            side: self.exec.params.side,
            offset: self.exec.params.offset,
            price: self.exec.params.price,
            volume: self.exec.params.volume,
            status: self.exec.status,
            traded: self.exec.traded,
            remaining: self.exec.remaining(),
            traded_price: self.exec.traded_price,
            parameters: report.parameters,
            variables: report.variables,
            timestamp: Utc::now(),
        }
    }

    // ---- Lifecycle transitions -------------------------------------------

    pub fn start(&mut self, services: &mut dyn AlgoServices) {
        if self.exec.status != AlgoStatus::Paused {
            return;
        }
        self.exec.status = AlgoStatus::Running;
        let mut ctx = AlgoContext { exec: &mut self.exec, services: &mut *services };
        self.policy.on_start(&mut ctx);
        self.publish(services);
    }

    /// Pauses a running instance; all open child orders are cancelled and
    /// the policy loses the right to act until resumed.
    pub fn pause(&mut self, services: &mut dyn AlgoServices) {
        if self.exec.status != AlgoStatus::Running {
            return;
        }
        self.exec.status = AlgoStatus::Paused;
        self.exec.cancel_all(services);
        info!(algo = %self.exec.id, "algo paused");
        self.publish(services);
    }

    pub fn resume(&mut self, services: &mut dyn AlgoServices) {
        if self.exec.status != AlgoStatus::Paused {
            return;
        }
        self.exec.status = AlgoStatus::Running;
        info!(algo = %self.exec.id, "algo resumed");
        self.publish(services);
    }

    /// Explicit user cancel: terminal from any live state.
    pub fn stop(&mut self, services: &mut dyn AlgoServices) {
        if self.exec.status.is_terminal() {
            return;
        }
        self.exec.status = AlgoStatus::Stopped;
        self.exec.cancel_all(services);
        info!(algo = %self.exec.id, "algo stopped");
        self.publish(services);
    }

    // ---- Inbound event delivery ------------------------------------------

    /// Tick delivery, gated on the running state.
    pub fn update_tick(&mut self, tick: &TickData, services: &mut dyn AlgoServices) {
        if self.exec.status != AlgoStatus::Running {
            return;
        }
        let mut ctx = AlgoContext { exec: &mut self.exec, services: &mut *services };
        self.policy.on_tick(tick, &mut ctx);
        self.publish(services);
    }

    /// Timer delivery, gated on the running state.
    pub fn update_timer(&mut self, services: &mut dyn AlgoServices) {
        if self.exec.status != AlgoStatus::Running {
            return;
        }
        let mut ctx = AlgoContext { exec: &mut self.exec, services: &mut *services };
        self.policy.on_timer(&mut ctx);
        self.publish(services);
    }

    /// Order delivery: bookkeeping first, then the policy callback.
    /// Never gated, so the open-order set stays correct across a pause.
    pub fn update_order(&mut self, order: &OrderData, services: &mut dyn AlgoServices) {
        self.exec.record_order(order);
        let mut ctx = AlgoContext { exec: &mut self.exec, services: &mut *services };
        self.policy.on_order(order, &mut ctx);
        self.publish(services);
    }

    /// Trade delivery: accounting first, then the policy callback.
    /// Never gated, so fills arriving across a pause are still applied.
    pub fn update_trade(&mut self, trade: &TradeData, services: &mut dyn AlgoServices) {
        self.exec.record_trade(trade);
        let mut ctx = AlgoContext { exec: &mut self.exec, services: &mut *services };
        self.policy.on_trade(trade, &mut ctx);
        self.publish(services);
    }

    fn publish(&self, services: &mut dyn AlgoServices) {
        services.publish(self.snapshot());
    }
}

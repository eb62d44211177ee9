//! # Dispatch Engine
//!
//! Owns every live algorithm instance, routes inbound tick/timer/order/trade
//! events to the interested instances, and mediates all outbound order
//! actions toward the gateway. The engine is single-threaded and
//! event-driven: every inbound event is processed to completion before the
//! next, so no locking is needed around the live-instance table.

use algos::{create_policy, AlgoInstance, AlgoParams, AlgoServices};
use core_types::{
    round_down_to, AlgoId, AlgoKind, ContractData, Offset, OrderData, OrderId, OrderRequest,
    OrderSide, TickData, TradeData,
};
use events::AlgoSnapshot;
use gateway::ExecutionGateway;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

pub mod error;

pub use error::EngineError;

/// Reference prefix attached to every outbound order.
pub const APP_NAME: &str = "AlgoTrading";

/// The engine state shared with running instances through `AlgoServices`.
///
/// Kept separate from the live-instance table so an instance can call back
/// into the engine (placing orders, reading ticks) while it is itself
/// mutably borrowed from that table.
struct EngineCore<G> {
    gateway: G,
    orderid_map: HashMap<OrderId, AlgoId>,
    snapshots: UnboundedSender<AlgoSnapshot>,
}

impl<G: ExecutionGateway> AlgoServices for EngineCore<G> {
    fn send_order(&mut self, algo_id: &AlgoId, mut req: OrderRequest) -> Option<OrderId> {
        let Some(contract) = self.gateway.get_contract(&req.symbol) else {
            warn!(algo = %algo_id, symbol = %req.symbol, "order dropped, contract not found");
            return None;
        };

        req.volume = round_down_to(req.volume, contract.min_volume);
        if req.volume <= Decimal::ZERO {
            // Rounded away entirely: an intentional no-op, not an error.
            debug!(algo = %algo_id, symbol = %req.symbol, "order quantity rounded to zero");
            return None;
        }
        req.reference = format!("{}_{}", APP_NAME, algo_id);

        match self.gateway.send_order(&req) {
            Ok(order_id) => {
                self.orderid_map.insert(order_id.clone(), algo_id.clone());
                Some(order_id)
            }
            Err(err) => {
                warn!(algo = %algo_id, symbol = %req.symbol, %err, "order refused by gateway");
                None
            }
        }
    }

    fn cancel_order(&mut self, algo_id: &AlgoId, order_id: &OrderId) {
        if self.gateway.get_order(order_id).is_none() {
            warn!(algo = %algo_id, order = %order_id, "cancel failed, order not found");
            return;
        }
        self.gateway.cancel_order(order_id);
    }

    fn get_tick(&self, symbol: &str) -> Option<TickData> {
        let tick = self.gateway.get_tick(symbol);
        if tick.is_none() {
            warn!(%symbol, "tick not available");
        }
        tick
    }

    fn get_contract(&self, symbol: &str) -> Option<ContractData> {
        let contract = self.gateway.get_contract(symbol);
        if contract.is_none() {
            warn!(%symbol, "contract not available");
        }
        contract
    }

    fn publish(&mut self, snapshot: AlgoSnapshot) {
        // The receiver side is a monitoring concern; a dropped receiver
        // must not disturb execution.
        let _ = self.snapshots.send(snapshot);
    }
}

/// The dispatcher/lifecycle engine owning all running instances.
pub struct AlgoEngine<G: ExecutionGateway> {
    core: EngineCore<G>,
    algos: HashMap<AlgoId, AlgoInstance>,
    symbol_map: HashMap<String, HashSet<AlgoId>>,
    counter: u64,
}

impl<G: ExecutionGateway> AlgoEngine<G> {
    /// Creates an engine over a gateway, returning the receiving end of the
    /// per-instance snapshot stream.
    pub fn new(gateway: G) -> (Self, UnboundedReceiver<AlgoSnapshot>) {
        let (tx, rx) = unbounded_channel();
        let engine = Self {
            core: EngineCore {
                gateway,
                orderid_map: HashMap::new(),
                snapshots: tx,
            },
            algos: HashMap::new(),
            symbol_map: HashMap::new(),
            counter: 0,
        };
        (engine, rx)
    }

    pub fn gateway(&self) -> &G {
        &self.core.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.core.gateway
    }

    /// The closed set of available slicing policies.
    pub fn list_policies() -> &'static [AlgoKind] {
        AlgoKind::all()
    }

    pub fn live_count(&self) -> usize {
        self.algos.len()
    }

    pub fn is_live(&self, algo_id: &AlgoId) -> bool {
        self.algos.contains_key(algo_id)
    }

    /// Snapshot of a live instance; `None` once it has been retired.
    pub fn snapshot(&self, algo_id: &AlgoId) -> Option<AlgoSnapshot> {
        self.algos.get(algo_id).map(|algo| algo.snapshot())
    }

    // ---- Control surface -------------------------------------------------

    /// Creates, registers and starts a new algorithm instance.
    ///
    /// Fails before any subscription or order placement on an unknown
    /// contract, a non-positive target quantity, or a policy setting the
    /// factory refuses.
    #[allow(clippy::too_many_arguments)]
    pub fn start_algo(
        &mut self,
        kind: AlgoKind,
        symbol: &str,
        side: OrderSide,
        offset: Offset,
        price: Decimal,
        volume: Decimal,
        setting: &Value,
    ) -> Result<AlgoId, EngineError> {
        if self.core.gateway.get_contract(symbol).is_none() {
            warn!(%symbol, "algo start failed, contract not found");
            return Err(EngineError::ContractNotFound(symbol.to_string()));
        }
        if volume <= Decimal::ZERO {
            return Err(EngineError::InvalidRequest(
                "target volume must be positive".to_string(),
            ));
        }

        self.counter += 1;
        let algo_id = AlgoId(format!("{}_{}", kind, self.counter));
        let params = AlgoParams {
            symbol: symbol.to_string(),
            side,
            offset,
            price,
            volume,
        };
        let policy = create_policy(kind, &params, setting)?;
        let instance = AlgoInstance::new(algo_id.clone(), kind, params, policy);

        // Subscribe on first interest: one facade call per symbol no matter
        // how many instances share it, reference-counted by membership in
        // the symbol index.
        let mut symbols = vec![symbol.to_string()];
        symbols.extend(instance.extra_subscriptions());
        for sym in symbols {
            let interested = self.symbol_map.entry(sym.clone()).or_default();
            if interested.is_empty() {
                self.core.gateway.subscribe(&sym);
            }
            interested.insert(algo_id.clone());
        }

        self.algos.insert(algo_id.clone(), instance);
        if let Some(instance) = self.algos.get_mut(&algo_id) {
            instance.start(&mut self.core);
        }
        info!(algo = %algo_id, %symbol, "algo started");
        self.retire_if_terminal(&algo_id);

        Ok(algo_id)
    }

    /// No-op if the instance is not live.
    pub fn pause_algo(&mut self, algo_id: &AlgoId) {
        if let Some(instance) = self.algos.get_mut(algo_id) {
            instance.pause(&mut self.core);
        }
    }

    /// No-op if the instance is not live.
    pub fn resume_algo(&mut self, algo_id: &AlgoId) {
        if let Some(instance) = self.algos.get_mut(algo_id) {
            instance.resume(&mut self.core);
        }
    }

    /// No-op if the instance is not live.
    pub fn stop_algo(&mut self, algo_id: &AlgoId) {
        if let Some(instance) = self.algos.get_mut(algo_id) {
            instance.stop(&mut self.core);
        }
        self.retire_if_terminal(algo_id);
    }

    /// Stops every live instance; used on shutdown.
    pub fn stop_all(&mut self) {
        for algo_id in self.algos.keys().cloned().collect::<Vec<_>>() {
            self.stop_algo(&algo_id);
        }
    }

    // ---- Inbound event routing -------------------------------------------

    /// Forwards a tick to every instance interested in its symbol.
    pub fn process_tick(&mut self, tick: &TickData) {
        let Some(interested) = self.symbol_map.get(&tick.symbol) else {
            return;
        };
        for algo_id in interested.iter().cloned().collect::<Vec<_>>() {
            if let Some(instance) = self.algos.get_mut(&algo_id) {
                instance.update_tick(tick, &mut self.core);
            }
            self.retire_if_terminal(&algo_id);
        }
    }

    /// Forwards the periodic timer to every live instance. The id list is
    /// snapshotted first so instances finishing mid-iteration cannot
    /// corrupt the iteration.
    pub fn process_timer(&mut self) {
        for algo_id in self.algos.keys().cloned().collect::<Vec<_>>() {
            if let Some(instance) = self.algos.get_mut(&algo_id) {
                instance.update_timer(&mut self.core);
            }
            self.retire_if_terminal(&algo_id);
        }
    }

    /// Forwards an order update to the owning instance. Updates for orders
    /// that did not originate here (or whose owner is already retired) are
    /// silently dropped.
    pub fn process_order(&mut self, order: &OrderData) {
        let Some(algo_id) = self.core.orderid_map.get(&order.order_id).cloned() else {
            return;
        };
        if let Some(instance) = self.algos.get_mut(&algo_id) {
            instance.update_order(order, &mut self.core);
        }
        self.retire_if_terminal(&algo_id);
    }

    /// Forwards a fill to the owning instance; same drop rules as
    /// `process_order`.
    pub fn process_trade(&mut self, trade: &TradeData) {
        let Some(algo_id) = self.core.orderid_map.get(&trade.order_id).cloned() else {
            return;
        };
        if let Some(instance) = self.algos.get_mut(&algo_id) {
            instance.update_trade(trade, &mut self.core);
        }
        self.retire_if_terminal(&algo_id);
    }

    /// Removes a terminal instance from the live table and every symbol
    /// index set. Its order-id index entries are left to decay naturally:
    /// late order/trade events simply find no live instance.
    fn retire_if_terminal(&mut self, algo_id: &AlgoId) {
        let terminal = self
            .algos
            .get(algo_id)
            .is_some_and(|algo| algo.status().is_terminal());
        if !terminal {
            return;
        }

        self.algos.remove(algo_id);
        for interested in self.symbol_map.values_mut() {
            interested.remove(algo_id);
        }
        info!(algo = %algo_id, "algo retired");
    }
}

use crate::execution::ExecState;
use core_types::{
    AlgoId, AlgoStatus, ContractData, Offset, OrderId, OrderRequest, OrderSide, OrderType,
    TickData,
};
use events::AlgoSnapshot;
use rust_decimal::Decimal;
use tracing::{info, warn};

/// The services the dispatch engine provides to running instances.
///
/// Implemented by the engine core; policies never see this trait directly,
/// only the `AlgoContext` wrapper around it.
pub trait AlgoServices {
    /// Forwards an order to the gateway after rounding the quantity to the
    /// contract's minimum increment, and records the order-id→instance
    /// mapping. Returns `None` for a no-op placement (quantity rounded to
    /// zero) or a failed/refused request.
    fn send_order(&mut self, algo_id: &AlgoId, req: OrderRequest) -> Option<OrderId>;

    /// Requests cancellation of a child order owned by `algo_id`.
    fn cancel_order(&mut self, algo_id: &AlgoId, order_id: &OrderId);

    /// Latest tick for a symbol, if available.
    fn get_tick(&self, symbol: &str) -> Option<TickData>;

    /// Contract metadata for a symbol, if known.
    fn get_contract(&self, symbol: &str) -> Option<ContractData>;

    /// Pushes a snapshot onto the monitoring stream.
    fn publish(&mut self, snapshot: AlgoSnapshot);
}

/// The capability handle a policy acts through.
///
/// Borrows the instance's execution state alongside the engine services, so
/// a policy can read its own bookkeeping and issue order actions without
/// ever owning either.
pub struct AlgoContext<'a> {
    pub(crate) exec: &'a mut ExecState,
    pub(crate) services: &'a mut dyn AlgoServices,
}

impl<'a> AlgoContext<'a> {
    pub fn id(&self) -> &AlgoId {
        &self.exec.id
    }

    pub fn symbol(&self) -> &str {
        &self.exec.params.symbol
    }

    pub fn side(&self) -> OrderSide {
        self.exec.params.side
    }

    pub fn offset(&self) -> Offset {
        self.exec.params.offset
    }

    /// The parent order's limit price.
    pub fn limit_price(&self) -> Decimal {
        self.exec.params.price
    }

    /// The parent order's total target quantity.
    pub fn volume(&self) -> Decimal {
        self.exec.params.volume
    }

    pub fn traded(&self) -> Decimal {
        self.exec.traded
    }

    /// Quantity still to execute, never negative.
    pub fn remaining(&self) -> Decimal {
        self.exec.remaining()
    }

    pub fn status(&self) -> AlgoStatus {
        self.exec.status
    }

    pub fn has_active_orders(&self) -> bool {
        !self.exec.active_orders.is_empty()
    }

    /// Latest tick for the instance's own symbol.
    pub fn own_tick(&self) -> Option<TickData> {
        self.services.get_tick(&self.exec.params.symbol)
    }

    pub fn tick(&self, symbol: &str) -> Option<TickData> {
        self.services.get_tick(symbol)
    }

    /// Contract metadata for the instance's own symbol.
    pub fn contract(&self) -> Option<ContractData> {
        self.services.get_contract(&self.exec.params.symbol)
    }

    /// Places a buy order on the instance's own symbol with its configured
    /// open/close intent.
    pub fn buy(&mut self, price: Decimal, volume: Decimal) -> Option<OrderId> {
        let offset = self.exec.params.offset;
        self.send(self.exec.params.symbol.clone(), OrderSide::Buy, offset, price, volume)
    }

    /// Places a sell order on the instance's own symbol with its configured
    /// open/close intent.
    pub fn sell(&mut self, price: Decimal, volume: Decimal) -> Option<OrderId> {
        let offset = self.exec.params.offset;
        self.send(self.exec.params.symbol.clone(), OrderSide::Sell, offset, price, volume)
    }

    /// Places an order on the instance's own symbol with no open/close
    /// intent. Used by policies that manage a standalone position (grid,
    /// the active arbitrage leg).
    pub fn place(&mut self, side: OrderSide, price: Decimal, volume: Decimal) -> Option<OrderId> {
        self.send(self.exec.params.symbol.clone(), side, Offset::None, price, volume)
    }

    /// Places an order on an arbitrary subscribed symbol (the passive
    /// arbitrage leg).
    pub fn place_leg(
        &mut self,
        symbol: &str,
        side: OrderSide,
        price: Decimal,
        volume: Decimal,
    ) -> Option<OrderId> {
        self.send(symbol.to_string(), side, Offset::None, price, volume)
    }

    fn send(
        &mut self,
        symbol: String,
        side: OrderSide,
        offset: Offset,
        price: Decimal,
        volume: Decimal,
    ) -> Option<OrderId> {
        if self.exec.status != AlgoStatus::Running {
            warn!(
                algo = %self.exec.id,
                status = ?self.exec.status,
                "order placement refused outside the running state"
            );
            return None;
        }

        info!(algo = %self.exec.id, %symbol, ?side, %volume, %price, "placing child order");
        let req = OrderRequest {
            symbol,
            side,
            offset,
            order_type: OrderType::Limit,
            price,
            volume,
            // Filled in by the engine with its own instance reference.
            reference: String::new(),
        };
        self.services.send_order(&self.exec.id, req)
    }

    pub fn cancel_order(&mut self, order_id: &OrderId) {
        self.services.cancel_order(&self.exec.id, order_id);
    }

    /// Issues a cancel for every currently open child order. No-op when
    /// none are open.
    pub fn cancel_all(&mut self) {
        self.exec.cancel_all(self.services);
    }

    /// Policy-triggered termination: the target is fully filled or the
    /// policy has decided to end. Cancels any residual open orders.
    pub fn finish(&mut self) {
        if self.exec.status != AlgoStatus::Running {
            return;
        }
        self.exec.status = AlgoStatus::Finished;
        self.exec.cancel_all(self.services);
        info!(algo = %self.exec.id, "algo finished");
    }
}

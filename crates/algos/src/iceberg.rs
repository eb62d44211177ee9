use crate::context::AlgoContext;
use crate::error::AlgoError;
use crate::AlgoPolicy;
use core_types::{OrderData, OrderId, OrderSide, TradeData};
use events::PolicyReport;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IcebergParams {
    /// The visible slice size; the resting child order never exceeds it.
    pub display_volume: Decimal,
    /// Ticks between consecutive checks.
    pub interval: u32,
}

/// Iceberg execution: shows at most one child order of a fixed display
/// size, replenishing it as slices complete, until the target is filled.
pub struct IcebergPolicy {
    params: IcebergParams,
    timer_count: u32,
    order_id: Option<OrderId>,
}

impl IcebergPolicy {
    pub fn new(params: IcebergParams) -> Result<Self, AlgoError> {
        if params.display_volume <= Decimal::ZERO {
            return Err(AlgoError::InvalidParameters(
                "display volume must be positive".to_string(),
            ));
        }
        if params.interval == 0 {
            return Err(AlgoError::InvalidParameters(
                "interval must be positive".to_string(),
            ));
        }

        Ok(Self {
            params,
            timer_count: 0,
            order_id: None,
        })
    }
}

impl AlgoPolicy for IcebergPolicy {
    fn on_order(&mut self, order: &OrderData, ctx: &mut AlgoContext<'_>) {
        info!(algo = %ctx.id(), order = %order.order_id, status = ?order.status, "order update");
        if !order.is_active() {
            self.order_id = None;
        }
    }

    fn on_trade(&mut self, _trade: &TradeData, ctx: &mut AlgoContext<'_>) {
        if ctx.traded() >= ctx.volume() {
            info!(algo = %ctx.id(), traded = %ctx.traded(), "target quantity filled");
            ctx.finish();
        }
    }

    fn on_timer(&mut self, ctx: &mut AlgoContext<'_>) {
        self.timer_count += 1;
        if self.timer_count < self.params.interval {
            return;
        }
        self.timer_count = 0;

        let Some(tick) = ctx.own_tick() else {
            return;
        };

        match self.order_id.clone() {
            // The previous slice is done; show the next one.
            None => {
                let volume = ctx.remaining().min(self.params.display_volume);
                let price = ctx.limit_price();
                self.order_id = match ctx.side() {
                    OrderSide::Buy => ctx.buy(price, volume),
                    OrderSide::Sell => ctx.sell(price, volume),
                };
            }
            // A slice is resting. If the book has crossed our limit the
            // order should have filled, so the update may be lost; cancel
            // it defensively and let the next cycle re-place.
            Some(order_id) => match ctx.side() {
                OrderSide::Buy => {
                    if tick.ask_price <= ctx.limit_price() {
                        info!(algo = %ctx.id(), order = %order_id, "best ask inside buy limit, cancelling stale slice");
                        ctx.cancel_order(&order_id);
                        self.order_id = None;
                    }
                }
                OrderSide::Sell => {
                    if tick.bid_price >= ctx.limit_price() {
                        info!(algo = %ctx.id(), order = %order_id, "best bid inside sell limit, cancelling stale slice");
                        ctx.cancel_order(&order_id);
                        self.order_id = None;
                    }
                }
            },
        }
    }

    fn report(&self) -> PolicyReport {
        PolicyReport {
            parameters: serde_json::to_value(&self.params).unwrap_or(Value::Null),
            variables: json!({
                "timer_count": self.timer_count,
                "order_id": self.order_id,
            }),
        }
    }
}

use crate::context::AlgoContext;
use crate::error::AlgoError;
use crate::AlgoPolicy;
use core_types::{OrderData, OrderId, OrderSide, OrderStatus, TickData, TradeData};
use events::PolicyReport;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopParams {
    /// Aggression offset added to (buy) or subtracted from (sell) the
    /// trigger price when the order is placed.
    pub price_add: Decimal,
}

/// Stop-trigger execution: dormant until the last traded price crosses the
/// trigger, then places a single order for the full remaining quantity at
/// the trigger price padded by `price_add`, clamped to the venue's daily
/// price limits when present.
pub struct StopPolicy {
    params: StopParams,
    order_id: Option<OrderId>,
    order_status: Option<OrderStatus>,
}

impl StopPolicy {
    pub fn new(params: StopParams) -> Result<Self, AlgoError> {
        if params.price_add < Decimal::ZERO {
            return Err(AlgoError::InvalidParameters(
                "price add must not be negative".to_string(),
            ));
        }

        Ok(Self {
            params,
            order_id: None,
            order_status: None,
        })
    }
}

impl AlgoPolicy for StopPolicy {
    fn on_tick(&mut self, tick: &TickData, ctx: &mut AlgoContext<'_>) {
        // Never re-trigger while an order is outstanding.
        if self.order_id.is_some() {
            return;
        }

        let trigger = ctx.limit_price();
        let volume = ctx.remaining();

        match ctx.side() {
            OrderSide::Buy => {
                if tick.last_price >= trigger {
                    let mut price = trigger + self.params.price_add;
                    if let Some(limit_up) = tick.limit_up {
                        price = price.min(limit_up);
                    }
                    self.order_id = ctx.buy(price, volume);
                    info!(
                        algo = %ctx.id(),
                        symbol = %ctx.symbol(),
                        %trigger,
                        %price,
                        %volume,
                        "stop order triggered"
                    );
                }
            }
            OrderSide::Sell => {
                if tick.last_price <= trigger {
                    let mut price = trigger - self.params.price_add;
                    if let Some(limit_down) = tick.limit_down {
                        price = price.max(limit_down);
                    }
                    self.order_id = ctx.sell(price, volume);
                    info!(
                        algo = %ctx.id(),
                        symbol = %ctx.symbol(),
                        %trigger,
                        %price,
                        %volume,
                        "stop order triggered"
                    );
                }
            }
        }
    }

    fn on_order(&mut self, order: &OrderData, _ctx: &mut AlgoContext<'_>) {
        self.order_status = Some(order.status);
        if !order.is_active() {
            self.order_id = None;
        }
    }

    fn on_trade(&mut self, _trade: &TradeData, ctx: &mut AlgoContext<'_>) {
        if ctx.traded() >= ctx.volume() {
            ctx.finish();
        }
    }

    fn report(&self) -> PolicyReport {
        PolicyReport {
            parameters: serde_json::to_value(&self.params).unwrap_or(Value::Null),
            variables: json!({
                "order_id": self.order_id,
                "order_status": self.order_status,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::{AlgoInstance, AlgoParams};
    use crate::testutil::{tick, MockServices};
    use core_types::{AlgoId, AlgoKind, Offset};
    use rust_decimal_macros::dec;

    fn instance(side: OrderSide) -> AlgoInstance {
        AlgoInstance::new(
            AlgoId("Stop_1".to_string()),
            AlgoKind::Stop,
            AlgoParams {
                symbol: "IF2301".to_string(),
                side,
                offset: Offset::Open,
                price: dec!(100),
                volume: dec!(10),
            },
            Box::new(StopPolicy::new(StopParams { price_add: dec!(5) }).unwrap()),
        )
    }

    #[test]
    fn rejects_negative_price_add() {
        assert!(StopPolicy::new(StopParams { price_add: dec!(-1) }).is_err());
        assert!(StopPolicy::new(StopParams { price_add: dec!(0) }).is_ok());
    }

    #[test]
    fn stays_dormant_until_the_trigger_crosses() {
        let mut services = MockServices::new();
        let mut inst = instance(OrderSide::Buy);
        inst.start(&mut services);

        inst.update_tick(&tick("IF2301", dec!(99), dec!(98), dec!(99)), &mut services);
        assert!(services.sent.is_empty());

        inst.update_tick(&tick("IF2301", dec!(100), dec!(99.5), dec!(100.5)), &mut services);
        let req = services.last_sent().unwrap();
        assert_eq!(req.price, dec!(105));
        assert_eq!(req.volume, dec!(10));

        // The outstanding order blocks a second trigger.
        inst.update_tick(&tick("IF2301", dec!(100), dec!(99.5), dec!(100.5)), &mut services);
        assert_eq!(services.sent.len(), 1);
    }

    #[test]
    fn padded_price_is_clamped_to_the_daily_limit() {
        let mut services = MockServices::new();
        let mut inst = instance(OrderSide::Sell);
        inst.start(&mut services);

        let mut crossed = tick("IF2301", dec!(99), dec!(98.5), dec!(99.5));
        crossed.limit_down = Some(dec!(97));
        inst.update_tick(&crossed, &mut services);

        // 100 - 5 would breach limit-down, so the order goes out at 97.
        assert_eq!(services.last_sent().unwrap().price, dec!(97));
    }
}

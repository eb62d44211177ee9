use crate::context::AlgoContext;
use crate::AlgoPolicy;
use core_types::{OrderData, OrderId, OrderSide, TickData, TradeData};
use events::PolicyReport;
use serde_json::json;
use tracing::info;

/// Sniper execution: waits for the opposing best price to cross the limit
/// favorably and takes whatever size is shown at that level. A sniper order
/// never rests — any outstanding child order is cancelled on the next tick.
pub struct SniperPolicy {
    order_id: Option<OrderId>,
}

impl SniperPolicy {
    pub fn new() -> Self {
        Self { order_id: None }
    }
}

impl Default for SniperPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl AlgoPolicy for SniperPolicy {
    fn on_tick(&mut self, tick: &TickData, ctx: &mut AlgoContext<'_>) {
        if self.order_id.is_some() {
            ctx.cancel_all();
            return;
        }

        let price = ctx.limit_price();
        match ctx.side() {
            OrderSide::Buy => {
                if tick.ask_price <= price {
                    let volume = ctx.remaining().min(tick.ask_volume);
                    self.order_id = ctx.buy(price, volume);
                }
            }
            OrderSide::Sell => {
                if tick.bid_price >= price {
                    let volume = ctx.remaining().min(tick.bid_volume);
                    self.order_id = ctx.sell(price, volume);
                }
            }
        }
    }

    fn on_order(&mut self, order: &OrderData, _ctx: &mut AlgoContext<'_>) {
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

    fn report(&self) -> PolicyReport {
        PolicyReport {
            parameters: json!({}),
            variables: json!({ "order_id": self.order_id }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::{AlgoInstance, AlgoParams};
    use crate::testutil::{tick_sized, MockServices};
    use core_types::{AlgoId, AlgoKind, Offset, OrderStatus};
    use rust_decimal_macros::dec;

    fn instance() -> AlgoInstance {
        AlgoInstance::new(
            AlgoId("Sniper_1".to_string()),
            AlgoKind::Sniper,
            AlgoParams {
                symbol: "IF2301".to_string(),
                side: OrderSide::Buy,
                offset: Offset::Open,
                price: dec!(100),
                volume: dec!(10),
            },
            Box::new(SniperPolicy::new()),
        )
    }

    #[test]
    fn takes_only_the_displayed_size() {
        let mut services = MockServices::new();
        let mut inst = instance();
        inst.start(&mut services);

        // 7 lots shown inside the limit: take 7, not the full 10.
        let thin = tick_sized("IF2301", dec!(99), dec!(98), dec!(20), dec!(99), dec!(7));
        inst.update_tick(&thin, &mut services);

        let req = services.last_sent().unwrap();
        assert_eq!(req.volume, dec!(7));
        assert_eq!(req.price, dec!(100));
    }

    #[test]
    fn pulls_an_unfilled_order_on_the_next_tick() {
        let mut services = MockServices::new();
        let mut inst = instance();
        inst.start(&mut services);

        let thin = tick_sized("IF2301", dec!(99), dec!(98), dec!(20), dec!(99), dec!(7));
        inst.update_tick(&thin, &mut services);
        inst.update_order(
            &crate::testutil::order_update("M.1", OrderStatus::NotTraded),
            &mut services,
        );

        inst.update_tick(&thin, &mut services);
        assert_eq!(services.cancelled, vec![core_types::OrderId("M.1".to_string())]);
        assert_eq!(services.sent.len(), 1);
    }

    #[test]
    fn ignores_an_unfavorable_book() {
        let mut services = MockServices::new();
        let mut inst = instance();
        inst.start(&mut services);

        let wide = tick_sized("IF2301", dec!(101), dec!(100.5), dec!(20), dec!(101), dec!(7));
        inst.update_tick(&wide, &mut services);
        assert!(services.sent.is_empty());
    }
}

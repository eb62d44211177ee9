use crate::context::AlgoContext;
use crate::error::AlgoError;
use crate::AlgoPolicy;
use core_types::{OrderData, OrderId, OrderSide, TickData, TradeData};
use events::PolicyReport;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestLimitParams {
    /// Smallest child-order quantity.
    pub min_volume: Decimal,
    /// Largest child-order quantity.
    pub max_volume: Decimal,
}

/// Randomized best-limit execution: continuously rests an order at the best
/// price on its own side, re-quoting whenever that price moves, with each
/// child order sized uniformly at random between the configured bounds to
/// avoid a recognisable footprint.
pub struct BestLimitPolicy {
    params: BestLimitParams,
    order_id: Option<OrderId>,
    order_price: Decimal,
}

impl BestLimitPolicy {
    pub fn new(params: BestLimitParams) -> Result<Self, AlgoError> {
        if params.min_volume <= Decimal::ZERO {
            return Err(AlgoError::InvalidParameters(
                "minimum volume must be positive".to_string(),
            ));
        }
        if params.max_volume < params.min_volume {
            return Err(AlgoError::InvalidParameters(
                "maximum volume must not be less than minimum volume".to_string(),
            ));
        }

        Ok(Self {
            params,
            order_id: None,
            order_price: Decimal::ZERO,
        })
    }

    /// A whole-number quantity drawn uniformly from the configured range.
    fn random_volume(&self) -> Decimal {
        let min = self.params.min_volume.to_f64().unwrap_or(0.0);
        let max = self.params.max_volume.to_f64().unwrap_or(min);
        let drawn: f64 = rand::thread_rng().gen_range(min..=max);
        Decimal::from(drawn.floor() as i64)
    }

    fn quote(&mut self, best_price: Decimal, ctx: &mut AlgoContext<'_>) {
        let volume = self.random_volume().min(ctx.remaining());
        self.order_price = best_price;
        self.order_id = match ctx.side() {
            OrderSide::Buy => ctx.buy(best_price, volume),
            OrderSide::Sell => ctx.sell(best_price, volume),
        };
    }
}

impl AlgoPolicy for BestLimitPolicy {
    fn on_tick(&mut self, tick: &TickData, ctx: &mut AlgoContext<'_>) {
        let best_price = match ctx.side() {
            OrderSide::Buy => tick.bid_price,
            OrderSide::Sell => tick.ask_price,
        };

        if self.order_id.is_none() {
            self.quote(best_price, ctx);
        } else if self.order_price != best_price {
            // The top of book moved away from our quote; pull it and
            // re-place on the next tick.
            ctx.cancel_all();
        }
    }

    fn on_order(&mut self, order: &OrderData, _ctx: &mut AlgoContext<'_>) {
        if !order.is_active() {
            self.order_id = None;
            self.order_price = Decimal::ZERO;
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
            parameters: serde_json::to_value(&self.params).unwrap_or(Value::Null),
            variables: json!({
                "order_id": self.order_id,
                "order_price": self.order_price,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_inverted_or_empty_bounds() {
        assert!(BestLimitPolicy::new(BestLimitParams {
            min_volume: dec!(0),
            max_volume: dec!(10)
        })
        .is_err());
        assert!(BestLimitPolicy::new(BestLimitParams {
            min_volume: dec!(10),
            max_volume: dec!(5)
        })
        .is_err());
        assert!(BestLimitPolicy::new(BestLimitParams {
            min_volume: dec!(5),
            max_volume: dec!(10)
        })
        .is_ok());
    }

    #[test]
    fn rests_at_the_best_bid_and_pulls_when_it_moves() {
        use crate::execution::{AlgoInstance, AlgoParams};
        use crate::testutil::{tick, MockServices};
        use core_types::{AlgoId, AlgoKind, Offset, OrderStatus};

        let mut services = MockServices::new();
        let mut inst = AlgoInstance::new(
            AlgoId("BestLimit_1".to_string()),
            AlgoKind::BestLimit,
            AlgoParams {
                symbol: "IF2301".to_string(),
                side: OrderSide::Buy,
                offset: Offset::Open,
                price: dec!(100),
                volume: dec!(10),
            },
            // Equal bounds pin the randomized size.
            Box::new(
                BestLimitPolicy::new(BestLimitParams {
                    min_volume: dec!(2),
                    max_volume: dec!(2),
                })
                .unwrap(),
            ),
        );
        inst.start(&mut services);

        inst.update_tick(&tick("IF2301", dec!(99), dec!(98), dec!(99)), &mut services);
        let req = services.last_sent().unwrap();
        assert_eq!(req.price, dec!(98));
        assert_eq!(req.volume, dec!(2));
        inst.update_order(
            &crate::testutil::order_update("M.1", OrderStatus::NotTraded),
            &mut services,
        );

        // The best bid moved away from the resting quote: pull it.
        inst.update_tick(&tick("IF2301", dec!(99), dec!(98.5), dec!(99)), &mut services);
        assert_eq!(services.cancelled, vec![core_types::OrderId("M.1".to_string())]);
    }

    #[test]
    fn random_volume_stays_in_bounds() {
        let policy = BestLimitPolicy::new(BestLimitParams {
            min_volume: dec!(3),
            max_volume: dec!(7),
        })
        .unwrap();

        for _ in 0..100 {
            let volume = policy.random_volume();
            assert!(volume >= dec!(3) && volume <= dec!(7), "out of range: {volume}");
        }
    }
}

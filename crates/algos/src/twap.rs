use crate::context::AlgoContext;
use crate::error::AlgoError;
use crate::execution::AlgoParams;
use crate::AlgoPolicy;
use core_types::{round_down_to, OrderSide, TradeData};
use events::PolicyReport;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwapParams {
    /// Total execution time, in timer ticks.
    pub time: u32,
    /// Ticks between consecutive slices.
    pub interval: u32,
}

/// Time-weighted average price execution.
///
/// Divides the target quantity evenly across `time / interval` slices and
/// places one slice every `interval` timer ticks at the parent limit price,
/// as long as the opposing best price is still inside the limit. Finishes
/// when the execution window closes or the target is filled.
pub struct TwapPolicy {
    params: TwapParams,
    order_volume: Decimal,
    timer_count: u32,
    total_count: u32,
}

impl TwapPolicy {
    pub fn new(params: TwapParams, algo: &AlgoParams) -> Result<Self, AlgoError> {
        if params.interval == 0 {
            return Err(AlgoError::InvalidParameters(
                "interval must be positive".to_string(),
            ));
        }
        if params.time < params.interval {
            return Err(AlgoError::InvalidParameters(
                "total time must be at least one interval".to_string(),
            ));
        }

        let slices = Decimal::from(params.time) / Decimal::from(params.interval);
        let order_volume = algo.volume / slices;

        Ok(Self {
            params,
            order_volume,
            timer_count: 0,
            total_count: 0,
        })
    }
}

impl AlgoPolicy for TwapPolicy {
    fn on_start(&mut self, ctx: &mut AlgoContext<'_>) {
        // Align the slice size with the contract's minimum increment once,
        // up front; the engine rounds again on every placement anyway.
        if let Some(contract) = ctx.contract() {
            self.order_volume = round_down_to(self.order_volume, contract.min_volume);
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
        self.total_count += 1;

        if self.total_count >= self.params.time {
            info!(algo = %ctx.id(), "execution window elapsed");
            ctx.finish();
            return;
        }

        if self.timer_count < self.params.interval {
            return;
        }
        self.timer_count = 0;

        let Some(tick) = ctx.own_tick() else {
            return;
        };

        ctx.cancel_all();

        let volume = self.order_volume.min(ctx.remaining());
        let price = ctx.limit_price();

        match ctx.side() {
            OrderSide::Buy => {
                if tick.ask_price <= price {
                    ctx.buy(price, volume);
                }
            }
            OrderSide::Sell => {
                if tick.bid_price >= price {
                    ctx.sell(price, volume);
                }
            }
        }
    }

    fn report(&self) -> PolicyReport {
        PolicyReport {
            parameters: serde_json::to_value(&self.params).unwrap_or(Value::Null),
            variables: json!({
                "order_volume": self.order_volume,
                "timer_count": self.timer_count,
                "total_count": self.total_count,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::AlgoInstance;
    use crate::testutil::{tick, MockServices};
    use core_types::{AlgoId, AlgoKind, Offset};
    use rust_decimal_macros::dec;

    fn algo_params(volume: Decimal) -> AlgoParams {
        AlgoParams {
            symbol: "IF2301".to_string(),
            side: OrderSide::Buy,
            offset: Offset::Open,
            price: dec!(100),
            volume,
        }
    }

    #[test]
    fn slice_size_divides_target_evenly() {
        let policy = TwapPolicy::new(
            TwapParams { time: 600, interval: 60 },
            &algo_params(dec!(100)),
        )
        .unwrap();
        assert_eq!(policy.order_volume, dec!(10));
    }

    #[test]
    fn places_one_slice_per_interval_inside_the_limit() {
        let mut services = MockServices::with_contract("IF2301", dec!(1));
        services.set_tick(tick("IF2301", dec!(99), dec!(98), dec!(99)));

        let mut inst = instance(dec!(100));
        inst.start(&mut services);

        for _ in 0..59 {
            inst.update_timer(&mut services);
        }
        assert!(services.sent.is_empty());

        inst.update_timer(&mut services);
        let req = services.last_sent().unwrap();
        assert_eq!(req.volume, dec!(10));
        assert_eq!(req.price, dec!(100));
        assert_eq!(services.sent.len(), 1);
    }

    #[test]
    fn holds_back_when_the_ask_is_outside_the_limit() {
        let mut services = MockServices::with_contract("IF2301", dec!(1));
        services.set_tick(tick("IF2301", dec!(101), dec!(100.5), dec!(101)));

        let mut inst = instance(dec!(100));
        inst.start(&mut services);

        for _ in 0..60 {
            inst.update_timer(&mut services);
        }
        assert!(services.sent.is_empty());
    }

    fn instance(volume: Decimal) -> AlgoInstance {
        let params = algo_params(volume);
        let policy =
            TwapPolicy::new(TwapParams { time: 600, interval: 60 }, &params).unwrap();
        AlgoInstance::new(
            AlgoId("Twap_1".to_string()),
            AlgoKind::Twap,
            params,
            Box::new(policy),
        )
    }

    #[test]
    fn rejects_degenerate_timing() {
        assert!(TwapPolicy::new(
            TwapParams { time: 600, interval: 0 },
            &algo_params(dec!(100))
        )
        .is_err());
        assert!(TwapPolicy::new(
            TwapParams { time: 30, interval: 60 },
            &algo_params(dec!(100))
        )
        .is_err());
    }
}

use crate::context::AlgoContext;
use crate::error::AlgoError;
use crate::AlgoPolicy;
use core_types::{OrderData, OrderId, OrderSide, TradeData};
use events::PolicyReport;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageParams {
    /// The hedging leg. The instance's own symbol is the active leg.
    pub passive_symbol: String,
    /// Short the spread when active bid − passive ask exceeds this.
    pub spread_up: Decimal,
    /// Long the spread when active ask − passive bid falls below the
    /// negation of this.
    pub spread_down: Decimal,
    /// Absolute cap on the active-leg position.
    pub max_pos: Decimal,
    /// Ticks between consecutive spread evaluations.
    pub interval: u32,
}

/// Two-leg arbitrage: trades the active leg when the synthetic spread
/// breaches its thresholds, and keeps the passive leg hedged so the net
/// position across both legs stays at zero. Any active-leg fill triggers
/// an immediate hedge attempt.
pub struct ArbitragePolicy {
    params: ArbitrageParams,
    timer_count: u32,
    active_order_id: Option<OrderId>,
    passive_order_id: Option<OrderId>,
    active_pos: Decimal,
    passive_pos: Decimal,
}

impl ArbitragePolicy {
    pub fn new(params: ArbitrageParams) -> Result<Self, AlgoError> {
        if params.passive_symbol.is_empty() {
            return Err(AlgoError::InvalidParameters(
                "passive symbol must not be empty".to_string(),
            ));
        }
        if params.max_pos <= Decimal::ZERO {
            return Err(AlgoError::InvalidParameters(
                "max position must be positive".to_string(),
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
            active_order_id: None,
            passive_order_id: None,
            active_pos: Decimal::ZERO,
            passive_pos: Decimal::ZERO,
        })
    }

    /// Issues a passive-leg order sized to bring the net position across
    /// both legs to exactly zero. A missing passive tick defers the hedge
    /// to the next cycle.
    fn hedge(&mut self, ctx: &mut AlgoContext<'_>) {
        let Some(tick) = ctx.tick(&self.params.passive_symbol) else {
            return;
        };

        let volume = -(self.active_pos + self.passive_pos);
        if volume > Decimal::ZERO {
            self.passive_order_id = ctx.place_leg(
                &self.params.passive_symbol,
                OrderSide::Buy,
                tick.ask_price,
                volume,
            );
        } else if volume < Decimal::ZERO {
            self.passive_order_id = ctx.place_leg(
                &self.params.passive_symbol,
                OrderSide::Sell,
                tick.bid_price,
                volume.abs(),
            );
        }
    }
}

impl AlgoPolicy for ArbitragePolicy {
    fn extra_subscriptions(&self) -> Vec<String> {
        vec![self.params.passive_symbol.clone()]
    }

    fn on_order(&mut self, order: &OrderData, ctx: &mut AlgoContext<'_>) {
        if order.symbol == ctx.symbol() {
            if !order.is_active() {
                self.active_order_id = None;
            }
        } else if order.symbol == self.params.passive_symbol {
            if !order.is_active() {
                self.passive_order_id = None;
            }
        }
    }

    fn on_trade(&mut self, trade: &TradeData, ctx: &mut AlgoContext<'_>) {
        let on_active = trade.symbol == ctx.symbol();
        match trade.side {
            OrderSide::Buy => {
                if on_active {
                    self.active_pos += trade.volume;
                } else {
                    self.passive_pos += trade.volume;
                }
            }
            OrderSide::Sell => {
                if on_active {
                    self.active_pos -= trade.volume;
                } else {
                    self.passive_pos -= trade.volume;
                }
            }
        }

        if on_active {
            info!(algo = %ctx.id(), "active leg filled, hedging");
            self.hedge(ctx);
        }
    }

    fn on_timer(&mut self, ctx: &mut AlgoContext<'_>) {
        self.timer_count += 1;
        if self.timer_count < self.params.interval {
            return;
        }
        self.timer_count = 0;

        // Clear the field before acting again.
        if self.active_order_id.is_some() || self.passive_order_id.is_some() {
            info!(algo = %ctx.id(), "outstanding orders, cancelling before next cycle");
            ctx.cancel_all();
            return;
        }

        // Restore the hedge before looking for new entries.
        if self.active_pos + self.passive_pos != Decimal::ZERO {
            info!(algo = %ctx.id(), "legs unbalanced, hedging");
            self.hedge(ctx);
            return;
        }

        let Some(active_tick) = ctx.own_tick() else {
            return;
        };
        let Some(passive_tick) = ctx.tick(&self.params.passive_symbol) else {
            return;
        };

        let spread_bid_price = active_tick.bid_price - passive_tick.ask_price;
        let spread_ask_price = active_tick.ask_price - passive_tick.bid_price;
        let spread_bid_volume = active_tick.bid_volume.min(passive_tick.ask_volume);
        let spread_ask_volume = active_tick.ask_volume.min(passive_tick.bid_volume);

        debug!(
            algo = %ctx.id(),
            %spread_bid_price,
            %spread_ask_price,
            "spread book"
        );

        if spread_bid_price > self.params.spread_up {
            // Spread rich: short the active leg.
            if self.active_pos > -self.params.max_pos {
                let volume = spread_bid_volume.min(self.active_pos + self.params.max_pos);
                self.active_order_id =
                    ctx.place(OrderSide::Sell, active_tick.bid_price, volume);
            }
        } else if spread_ask_price < -self.params.spread_down {
            // Spread cheap: long the active leg.
            if self.active_pos < self.params.max_pos {
                let volume = spread_ask_volume.min(self.params.max_pos - self.active_pos);
                self.active_order_id =
                    ctx.place(OrderSide::Buy, active_tick.ask_price, volume);
            }
        }
    }

    fn report(&self) -> PolicyReport {
        PolicyReport {
            parameters: serde_json::to_value(&self.params).unwrap_or(Value::Null),
            variables: json!({
                "timer_count": self.timer_count,
                "active_order_id": self.active_order_id,
                "passive_order_id": self.passive_order_id,
                "active_pos": self.active_pos,
                "passive_pos": self.passive_pos,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn params() -> ArbitrageParams {
        ArbitrageParams {
            passive_symbol: "IF2306".to_string(),
            spread_up: dec!(5),
            spread_down: dec!(5),
            max_pos: dec!(10),
            interval: 2,
        }
    }

    #[test]
    fn rejects_invalid_settings() {
        let mut p = params();
        p.passive_symbol = String::new();
        assert!(ArbitragePolicy::new(p).is_err());

        let mut p = params();
        p.max_pos = dec!(0);
        assert!(ArbitragePolicy::new(p).is_err());

        let mut p = params();
        p.interval = 0;
        assert!(ArbitragePolicy::new(p).is_err());

        assert!(ArbitragePolicy::new(params()).is_ok());
    }

    #[test]
    fn subscribes_the_passive_leg() {
        let policy = ArbitragePolicy::new(params()).unwrap();
        assert_eq!(policy.extra_subscriptions(), vec!["IF2306".to_string()]);
    }

    #[test]
    fn enters_a_rich_spread_and_hedges_the_fill() {
        use crate::execution::{AlgoInstance, AlgoParams};
        use crate::testutil::{order_update_for, tick, trade_for, MockServices};
        use core_types::{AlgoId, AlgoKind, Offset, OrderStatus};

        let mut services = MockServices::new();
        // Active bid 110 against passive ask 100.5: spread bid 9.5 > 5.
        services.set_tick(tick("IF2301", dec!(110), dec!(110), dec!(111)));
        services.set_tick(tick("IF2306", dec!(100), dec!(100), dec!(100.5)));

        let mut inst = AlgoInstance::new(
            AlgoId("Arbitrage_1".to_string()),
            AlgoKind::Arbitrage,
            AlgoParams {
                symbol: "IF2301".to_string(),
                side: OrderSide::Buy,
                offset: Offset::None,
                price: dec!(0),
                volume: dec!(100),
            },
            Box::new(ArbitragePolicy::new(params()).unwrap()),
        );
        inst.start(&mut services);

        inst.update_timer(&mut services);
        assert!(services.sent.is_empty());
        inst.update_timer(&mut services);

        // Short the active leg, capped by max_pos.
        let req = services.last_sent().unwrap();
        assert_eq!(req.symbol, "IF2301");
        assert_eq!(req.side, OrderSide::Sell);
        assert_eq!(req.price, dec!(110));
        assert_eq!(req.volume, dec!(10));

        // The active fill immediately buys the passive leg flat.
        inst.update_order(
            &order_update_for("IF2301", "M.1", OrderStatus::AllTraded),
            &mut services,
        );
        inst.update_trade(
            &trade_for("IF2301", "T.1", "M.1", OrderSide::Sell, dec!(110), dec!(10)),
            &mut services,
        );
        let req = services.last_sent().unwrap();
        assert_eq!(req.symbol, "IF2306");
        assert_eq!(req.side, OrderSide::Buy);
        assert_eq!(req.price, dec!(100.5));
        assert_eq!(req.volume, dec!(10));

        inst.update_trade(
            &trade_for("IF2306", "T.2", "M.2", OrderSide::Buy, dec!(100.5), dec!(10)),
            &mut services,
        );
        let report = inst.snapshot();
        assert_eq!(report.variables["active_pos"], serde_json::json!("-10"));
        assert_eq!(report.variables["passive_pos"], serde_json::json!("10"));
    }
}

use crate::context::AlgoContext;
use crate::error::AlgoError;
use crate::AlgoPolicy;
use core_types::{OrderData, OrderId, OrderSide, TickData, TradeData};
use events::PolicyReport;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridParams {
    /// Price distance between adjacent grid levels.
    pub step_price: Decimal,
    /// Quantity bought/sold per level crossed.
    pub step_volume: Decimal,
    /// Ticks between consecutive re-evaluations.
    pub interval: u32,
}

/// Grid trading around the parent price: every `interval` timer ticks the
/// policy derives a target position from how far the market has moved from
/// the center, then trades the shortfall — buying as price falls below the
/// grid, selling as it rises above. Grid instances never self-finish; they
/// persist to keep re-averaging.
pub struct GridPolicy {
    params: GridParams,
    pos: Decimal,
    timer_count: u32,
    order_id: Option<OrderId>,
    last_tick: Option<TickData>,
}

impl GridPolicy {
    pub fn new(params: GridParams) -> Result<Self, AlgoError> {
        if params.step_price <= Decimal::ZERO {
            return Err(AlgoError::InvalidParameters(
                "step price must be positive".to_string(),
            ));
        }
        if params.step_volume <= Decimal::ZERO {
            return Err(AlgoError::InvalidParameters(
                "step volume must be positive".to_string(),
            ));
        }
        if params.interval == 0 {
            return Err(AlgoError::InvalidParameters(
                "interval must be positive".to_string(),
            ));
        }

        Ok(Self {
            params,
            pos: Decimal::ZERO,
            timer_count: 0,
            order_id: None,
            last_tick: None,
        })
    }
}

impl AlgoPolicy for GridPolicy {
    fn on_tick(&mut self, tick: &TickData, _ctx: &mut AlgoContext<'_>) {
        self.last_tick = Some(tick.clone());
    }

    fn on_timer(&mut self, ctx: &mut AlgoContext<'_>) {
        let Some(tick) = self.last_tick.clone() else {
            return;
        };

        self.timer_count += 1;
        if self.timer_count < self.params.interval {
            return;
        }
        self.timer_count = 0;

        if self.order_id.is_some() {
            ctx.cancel_all();
        }

        let center = ctx.limit_price();

        // Levels below the center (price fell) set the buy-side target,
        // levels above it the sell-side target.
        let buy_distance = (center - tick.ask_price) / self.params.step_price;
        let target_buy_pos = buy_distance.floor() * self.params.step_volume;
        let buy_volume = target_buy_pos - self.pos;

        let sell_distance = (center - tick.bid_price) / self.params.step_price;
        let target_sell_pos = sell_distance.ceil() * self.params.step_volume;
        let sell_volume = self.pos - target_sell_pos;

        if buy_volume > Decimal::ZERO {
            self.order_id = ctx.place(
                OrderSide::Buy,
                tick.ask_price,
                buy_volume.min(tick.ask_volume),
            );
        } else if sell_volume > Decimal::ZERO {
            self.order_id = ctx.place(
                OrderSide::Sell,
                tick.bid_price,
                sell_volume.min(tick.bid_volume),
            );
        }
    }

    fn on_order(&mut self, order: &OrderData, _ctx: &mut AlgoContext<'_>) {
        if !order.is_active() {
            self.order_id = None;
        }
    }

    fn on_trade(&mut self, trade: &TradeData, _ctx: &mut AlgoContext<'_>) {
        match trade.side {
            OrderSide::Buy => self.pos += trade.volume,
            OrderSide::Sell => self.pos -= trade.volume,
        }
    }

    fn report(&self) -> PolicyReport {
        PolicyReport {
            parameters: serde_json::to_value(&self.params).unwrap_or(Value::Null),
            variables: json!({
                "pos": self.pos,
                "timer_count": self.timer_count,
                "order_id": self.order_id,
            }),
        }
    }
}

//! # Algo Policy Library
//!
//! This crate contains the core execution logic of the system. It defines
//! the per-instance execution state machine (`ExecState` / `AlgoInstance`),
//! the `AlgoPolicy` trait every slicing policy implements, and the seven
//! concrete policy variants.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of
//!   gateways or event transport. Policies act exclusively through the
//!   `AlgoContext` handle, whose `AlgoServices` backing is provided by the
//!   dispatch engine.
//! - **Shared State Machine:** Lifecycle transitions, child-order
//!   bookkeeping and traded-quantity accounting live in `ExecState`, shared
//!   by every policy. A policy only decides *when* and *how much* to trade.
//! - **Extensibility:** Adding a policy involves creating a new module,
//!   implementing the `AlgoPolicy` trait, and adding it to `AlgoKind` and
//!   the factory.
//!
//! ## Public API
//!
//! - `AlgoPolicy`: the callback contract all policies implement.
//! - `AlgoInstance` / `ExecState`: the execution state machine.
//! - `AlgoContext` / `AlgoServices`: the capability seam toward the engine.
//! - `create_policy`: the factory function used by the engine on start.

// Declare all the modules that constitute this crate.
pub mod arbitrage;
pub mod best_limit;
pub mod context;
pub mod error;
pub mod execution;
pub mod factory;
pub mod grid;
pub mod iceberg;
pub mod sniper;
pub mod stop;
pub mod twap;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export the key components to create a clean, public-facing API.
pub use arbitrage::{ArbitrageParams, ArbitragePolicy};
pub use best_limit::{BestLimitParams, BestLimitPolicy};
pub use context::{AlgoContext, AlgoServices};
pub use error::AlgoError;
pub use execution::{AlgoInstance, AlgoParams, ExecState};
pub use factory::create_policy;
pub use grid::{GridParams, GridPolicy};
pub use iceberg::{IcebergParams, IcebergPolicy};
pub use sniper::SniperPolicy;
pub use stop::{StopParams, StopPolicy};
pub use twap::{TwapParams, TwapPolicy};

use core_types::{OrderData, TickData, TradeData};
use events::PolicyReport;

/// The callback contract every slicing policy implements.
///
/// All callbacks default to no-ops, so a policy only implements the events
/// it reacts to. Tick and timer callbacks are invoked only while the
/// instance is running; order and trade callbacks are always invoked, so a
/// policy can keep its private counters correct across a pause. Order
/// placement through the context is itself refused outside the running
/// state, which keeps a paused policy from acting by accident.
pub trait AlgoPolicy: Send {
    /// Invoked once on the transition into the running state.
    fn on_start(&mut self, _ctx: &mut AlgoContext<'_>) {}

    /// Invoked for every tick of a subscribed symbol.
    fn on_tick(&mut self, _tick: &TickData, _ctx: &mut AlgoContext<'_>) {}

    /// Invoked for every status update of a child order owned by this
    /// instance, after the open-order set has been updated.
    fn on_order(&mut self, _order: &OrderData, _ctx: &mut AlgoContext<'_>) {}

    /// Invoked for every fill on a child order owned by this instance,
    /// after traded quantity and average price have been updated.
    fn on_trade(&mut self, _trade: &TradeData, _ctx: &mut AlgoContext<'_>) {}

    /// Invoked on every periodic timer tick.
    fn on_timer(&mut self, _ctx: &mut AlgoContext<'_>) {}

    /// Symbols beyond the instance's own that the engine must subscribe to
    /// and route ticks for (e.g. the passive leg of an arbitrage pair).
    fn extra_subscriptions(&self) -> Vec<String> {
        Vec::new()
    }

    /// Explicit parameter/variable snapshot for the monitoring stream.
    fn report(&self) -> PolicyReport;
}

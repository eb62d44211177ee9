//! # Gateway Crate
//!
//! This crate is the boundary between the algorithm engine and the host
//! trading system. It defines the `ExecutionGateway` trait — the full set of
//! market-data and order primitives the engine consumes — and provides
//! `SimGateway`, an in-memory paper venue used by the demo binary and the
//! test suites.
//!
//! ## Architectural Principles
//!
//! - **Execution Abstraction:** The `ExecutionGateway` trait keeps the
//!   engine completely agnostic about whether it is talking to a simulated
//!   venue or a real one.
//! - **Fire-and-forget:** Placing or cancelling an order never blocks; the
//!   resulting order/trade updates arrive later as ordinary inbound events.

pub mod error;
pub mod sim;

// Re-export the key components to provide a clean, public-facing API.
pub use error::GatewayError;
pub use sim::SimGateway;

use core_types::{ContractData, OrderData, OrderId, OrderRequest, TickData};

/// The market/order facade consumed by the dispatch engine.
///
/// All methods are synchronous: the engine core is a single-threaded event
/// loop, and order placement is a non-blocking request whose outcome is
/// reported through later order/trade events.
pub trait ExecutionGateway {
    /// Static metadata for a symbol, or `None` if the contract is unknown.
    fn get_contract(&self, symbol: &str) -> Option<ContractData>;

    /// The most recent tick for a symbol, if any has been received.
    fn get_tick(&self, symbol: &str) -> Option<TickData>;

    /// The current state of a previously placed order, if the venue still
    /// knows about it.
    fn get_order(&self, order_id: &OrderId) -> Option<OrderData>;

    /// Starts market data flowing for a symbol. Subscribing twice to the
    /// same symbol must be harmless.
    fn subscribe(&mut self, symbol: &str);

    /// Transmits an order to the venue and returns its assigned id.
    fn send_order(&mut self, req: &OrderRequest) -> Result<OrderId, GatewayError>;

    /// Requests cancellation of an order. Best-effort; the cancel is
    /// confirmed (or not) by a later order update.
    fn cancel_order(&mut self, order_id: &OrderId);
}

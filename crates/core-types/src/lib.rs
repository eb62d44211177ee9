pub mod enums;
pub mod num;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{AlgoKind, AlgoStatus, Offset, OrderSide, OrderStatus, OrderType};
pub use num::round_down_to;
pub use structs::{
    AlgoId, ContractData, OrderData, OrderId, OrderRequest, TickData, TradeData,
};

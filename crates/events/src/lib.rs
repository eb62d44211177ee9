pub mod messages;

pub use messages::{AlgoSnapshot, PolicyReport};

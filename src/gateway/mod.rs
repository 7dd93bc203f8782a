//! Execution gateways
//!
//! The compiler and mapper never touch a graph backend directly; query text
//! crosses into a backend through the `ExecutionGateway` trait. The
//! `FixtureGateway` replays recorded result sets.

mod fixture;
mod traits;

pub use fixture::FixtureGateway;
pub use traits::{ExecutionGateway, GatewayError, GatewayResult, ResultSet};

//! Payment-gateway adapter and transaction-orchestration layer.
//!
//! This crate sits between an order-management system and a third-party
//! payment processor. It decides which processor operation to run for a
//! payment attempt (authorize, capture, void, refund), normalizes the
//! processor's heterogeneous results into one
//! [`GatewayResponse`](domain::response::GatewayResponse) shape, and keeps
//! raw processor diagnostics out of user-facing error messages.
//!
//! The processor itself is reached only through the
//! [`ProcessorClient`](domain::ports::ProcessorClient) port; production
//! deployments plug an SDK-backed [`ClientFactory`](domain::ports::ClientFactory)
//! in, while the bundled [`SimulatedGateway`](infrastructure::simulated::SimulatedGateway)
//! and [`SimulatedClient`](infrastructure::simulated::SimulatedClient) cover
//! tests and sandbox flows.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

use application::gateway::ProcessorGateway;
use domain::ports::{ClientFactoryBox, PaymentGatewayBox};
use infrastructure::simulated::SimulatedGateway;

/// Constructs the real gateway variant over an SDK-backed client factory.
pub fn processor_gateway(
    factory: ClientFactoryBox,
    gateway_name: impl Into<String>,
) -> PaymentGatewayBox {
    Box::new(ProcessorGateway::new(factory, gateway_name))
}

/// Constructs the simulated gateway variant. Selection between the two
/// variants happens here, at construction time, never by shadowing.
pub fn simulated_gateway() -> PaymentGatewayBox {
    Box::new(SimulatedGateway::new())
}

//! Payment gateway adapters.

mod mock_gateway;
mod nmi_gateway;

pub use mock_gateway::MockPaymentGateway;
pub use nmi_gateway::{NmiConfig, NmiGateway, DEFAULT_TRANSACT_URL};

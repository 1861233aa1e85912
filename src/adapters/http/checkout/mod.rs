//! HTTP adapter for the per-session checkout flow.

mod dto;
mod handlers;
mod registry;
mod routes;

pub use dto::{PayResponse, SessionView, StepResponse, TokenEventRequest, UpdateSessionRequest};
pub use handlers::CheckoutHandlers;
pub use registry::{SessionRegistry, SharedOrchestrator};
pub use routes::checkout_routes;

//! Per-session checkout orchestration.

mod orchestrator;

pub use orchestrator::{CheckoutOrchestrator, CheckoutServices, CheckoutStep};

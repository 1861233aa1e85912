//! 3-D Secure challenge adapters.
//!
//! - `ClientDrivenChallenge` - the browser widget runs the challenge and
//!   posts the result back; starting it server-side is a no-op
//! - `ScriptedChallenge` - test double with controllable readiness and failures

mod client_driven;
mod scripted;

pub use client_driven::ClientDrivenChallenge;
pub use scripted::ScriptedChallenge;

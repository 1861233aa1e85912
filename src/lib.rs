//! Checkout orchestrator - card and wallet payments from deep link to redirect.
//!
//! A payment page opens a session from a (optionally signed) deep link, the
//! payer fills in details, a tokenization widget supplies a payment token,
//! cards go through a 3-D Secure challenge, and the charge is submitted to
//! the gateway exactly once. Every terminal outcome is fanned out to signed
//! webhook subscribers and ends in a single redirect.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod server;

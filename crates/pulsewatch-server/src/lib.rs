//! pulsewatch server library entry.
//!
//! Wires config, application state, the instrumented `/api` endpoint, the
//! `/metrics` scrape endpoint and the synthetic load generator into one HTTP
//! service. Consumed by the binary (`main.rs`) and by integration tests.

pub mod api;
pub mod app_state;
pub mod config;
pub mod load;
pub mod obs;
pub mod ops;
pub mod router;
pub mod server;

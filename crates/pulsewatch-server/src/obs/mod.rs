//! Application instruments.
//!
//! The instrument set is built and registered once at startup; handlers and
//! the load generator record into it through `AppState`.

pub mod metrics;

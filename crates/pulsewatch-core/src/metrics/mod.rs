//! Metric instruments and the registry that renders them.
//!
//! Instruments are plain structs backed by atomics (labelled series live in a
//! `DashMap`). They are created once at startup, registered into a
//! [`Registry`] and shared via `Arc` for the rest of the process lifetime.
//! Rendering follows the Prometheus text exposition format, version 0.0.4.

mod encode;

pub mod counter;
pub mod gauge;
pub mod histogram;
pub mod process;
pub mod registry;

pub use counter::Counter;
pub use gauge::Gauge;
pub use histogram::{Histogram, HistogramSnapshot, HistogramTimer};
pub use process::ProcessCollector;
pub use registry::{Collector, Registry, CONTENT_TYPE};

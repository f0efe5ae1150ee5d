//! pulsewatch core: metric instruments, the registry and its text encoder.
//!
//! This crate carries no runtime or HTTP dependencies. It defines the
//! instruments the server records into, the registry that owns them for the
//! process lifetime, and the random-source seam used by anything that needs
//! nondeterminism (so tests can pin outcomes).
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Bad metric names,
//! bucket layouts and label arity all surface as `PulseError`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;
pub mod random;

pub use error::{ErrorKind, PulseError, Result};

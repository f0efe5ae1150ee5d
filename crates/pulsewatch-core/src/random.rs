//! Random-source seam.
//!
//! Everything nondeterministic (error injection, the synthetic gauge) draws
//! from a [`RandomSource`] so tests can swap in a seeded or scripted one.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Largest f64 strictly below 1.0.
const BELOW_ONE: f64 = 1.0 - f64::EPSILON / 2.0;

pub trait RandomSource: Send + Sync {
    /// Uniform draw in `[0, 1)`.
    fn next_unit(&self) -> f64;

    /// `true` with probability `p`.
    fn chance(&self, p: f64) -> bool {
        self.next_unit() < p
    }

    /// Uniform integer in `[0, n)`; `0` when `n == 0`.
    fn below(&self, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }
        ((self.next_unit() * n as f64) as u64).min(n - 1)
    }
}

/// rand's thread-local generator. Default for production.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Reproducible generator seeded from a `u64`.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&self) -> f64 {
        match self.rng.lock() {
            Ok(mut rng) => rng.gen::<f64>(),
            Err(poisoned) => poisoned.into_inner().gen::<f64>(),
        }
    }
}

/// Cycles through a fixed list of draws (clamped into `[0, 1)`).
pub struct SequenceRandom {
    values: Vec<f64>,
    next: AtomicUsize,
}

impl SequenceRandom {
    pub fn new(values: Vec<f64>) -> Self {
        let values = values
            .into_iter()
            .map(|v| if v.is_nan() { 0.0 } else { v.clamp(0.0, BELOW_ONE) })
            .collect();
        Self {
            values,
            next: AtomicUsize::new(0),
        }
    }
}

impl RandomSource for SequenceRandom {
    fn next_unit(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let i = self.next.fetch_add(1, Ordering::Relaxed);
        self.values[i % self.values.len()]
    }
}

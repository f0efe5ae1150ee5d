use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;
use crate::metrics::encode;
use crate::metrics::registry::Collector;

/// Settable floating point value (bit-cast into an `AtomicU64`).
pub struct Gauge {
    name: String,
    help: String,
    bits: AtomicU64,
}

impl Gauge {
    pub fn new(name: &str, help: &str) -> Result<Self> {
        encode::validate_metric_name(name)?;
        Ok(Self {
            name: name.to_string(),
            help: help.to_string(),
            bits: AtomicU64::new(0f64.to_bits()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set(&self, v: f64) {
        self.bits.store(v.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub fn inc(&self) {
        self.add(1.0);
    }

    pub fn dec(&self) {
        self.add(-1.0);
    }

    /// Add a signed delta (CAS loop, no lost updates).
    pub fn add(&self, delta: f64) {
        let _ = self
            .bits
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |cur| {
                Some((f64::from_bits(cur) + delta).to_bits())
            });
    }
}

impl Collector for Gauge {
    fn names(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    fn encode(&self, out: &mut String) {
        encode::write_header(out, &self.name, &self.help, "gauge");
        out.push_str(&self.name);
        out.push(' ');
        out.push_str(&encode::fmt_float(self.get()));
        out.push('\n');
    }
}

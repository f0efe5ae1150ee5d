use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::error::{PulseError, Result};
use crate::metrics::encode;
use crate::metrics::registry::Collector;

/// Fixed-bucket histogram over `f64` observations (seconds, for latencies).
///
/// Every observation increments exactly one slot: the first bucket whose
/// upper bound is `>=` the value, or the trailing overflow slot. Cumulative
/// counts are summed at read time, so a snapshot is always non-decreasing in
/// bound order and its `+Inf` bucket equals its count, even while other
/// threads are observing.
pub struct Histogram {
    name: String,
    help: String,
    bounds: Vec<f64>,
    slots: Vec<AtomicU64>,
    sum_bits: AtomicU64,
}

/// Point-in-time read of a histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// `(upper bound, cumulative count)` for each finite bound.
    pub buckets: Vec<(f64, u64)>,
    pub sum: f64,
    /// Total observations; also the implicit `+Inf` bucket.
    pub count: u64,
}

impl Histogram {
    pub fn new(name: &str, help: &str, buckets: &[f64]) -> Result<Self> {
        encode::validate_metric_name(name)?;
        if buckets.is_empty() {
            return Err(PulseError::InvalidMetric(format!("{name}: no buckets")));
        }
        if buckets.iter().any(|b| !b.is_finite()) {
            return Err(PulseError::InvalidMetric(format!(
                "{name}: bucket bounds must be finite"
            )));
        }
        if buckets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(PulseError::InvalidMetric(format!(
                "{name}: bucket bounds must be strictly ascending"
            )));
        }

        Ok(Self {
            name: name.to_string(),
            help: help.to_string(),
            bounds: buckets.to_vec(),
            slots: (0..=buckets.len()).map(|_| AtomicU64::new(0)).collect(),
            sum_bits: AtomicU64::new(0f64.to_bits()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    /// Record one observation. NaN and negative values are dropped.
    pub fn observe(&self, v: f64) {
        if v.is_nan() || v < 0.0 {
            tracing::debug!(metric = %self.name, value = v, "histogram observation dropped");
            return;
        }
        let idx = self.bounds.partition_point(|b| *b < v);
        self.slots[idx].fetch_add(1, Ordering::Relaxed);
        let _ = self
            .sum_bits
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |cur| {
                Some((f64::from_bits(cur) + v).to_bits())
            });
    }

    /// Start a wall-clock measurement that records into this histogram.
    pub fn start_timer(&self) -> HistogramTimer<'_> {
        HistogramTimer {
            histogram: self,
            start: Instant::now(),
            observed: false,
        }
    }

    pub fn snapshot(&self) -> HistogramSnapshot {
        let mut acc = 0u64;
        let mut buckets = Vec::with_capacity(self.bounds.len());
        for (bound, slot) in self.bounds.iter().zip(&self.slots) {
            acc += slot.load(Ordering::Relaxed);
            buckets.push((*bound, acc));
        }
        let overflow = self.slots.last().map(|s| s.load(Ordering::Relaxed)).unwrap_or(0);

        HistogramSnapshot {
            buckets,
            sum: f64::from_bits(self.sum_bits.load(Ordering::Relaxed)),
            count: acc + overflow,
        }
    }
}

impl Collector for Histogram {
    fn names(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    fn encode(&self, out: &mut String) {
        encode::write_header(out, &self.name, &self.help, "histogram");
        let snap = self.snapshot();
        for (le, count) in &snap.buckets {
            let _ = writeln!(
                out,
                "{}_bucket{{le=\"{}\"}} {}",
                self.name,
                encode::fmt_float(*le),
                count
            );
        }
        let _ = writeln!(out, "{}_bucket{{le=\"+Inf\"}} {}", self.name, snap.count);
        let _ = writeln!(out, "{}_sum {}", self.name, encode::fmt_float(snap.sum));
        let _ = writeln!(out, "{}_count {}", self.name, snap.count);
    }
}

/// Running latency measurement.
///
/// Call [`observe_duration`](Self::observe_duration) to stop it; a timer that
/// is simply dropped records on drop. Either way it records exactly once.
pub struct HistogramTimer<'a> {
    histogram: &'a Histogram,
    start: Instant,
    observed: bool,
}

impl HistogramTimer<'_> {
    /// Stop the timer, record the elapsed seconds and return them.
    pub fn observe_duration(mut self) -> f64 {
        self.record()
    }

    fn record(&mut self) -> f64 {
        let secs = self.start.elapsed().as_secs_f64();
        if !self.observed {
            self.observed = true;
            self.histogram.observe(secs);
        }
        secs
    }
}

impl Drop for HistogramTimer<'_> {
    fn drop(&mut self) {
        if !self.observed {
            self.record();
        }
    }
}

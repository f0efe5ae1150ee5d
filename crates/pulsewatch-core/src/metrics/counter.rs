use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::error::{PulseError, Result};
use crate::metrics::encode;
use crate::metrics::registry::Collector;

/// Monotonic counter with an optional fixed set of label names.
///
/// Label values are passed positionally, in the order the names were declared.
/// A labelled combination does not exist until its first increment; an
/// unlabelled counter has exactly one series and starts at zero.
pub struct Counter {
    name: String,
    help: String,
    label_names: Vec<String>,
    series: DashMap<Vec<String>, AtomicU64>,
}

impl Counter {
    pub fn new(name: &str, help: &str, label_names: &[&str]) -> Result<Self> {
        encode::validate_metric_name(name)?;
        for l in label_names {
            encode::validate_label_name(l)?;
        }
        for (i, l) in label_names.iter().enumerate() {
            if label_names[..i].contains(l) {
                return Err(PulseError::InvalidMetric(format!(
                    "{name}: duplicate label name {l:?}"
                )));
            }
        }

        let series = DashMap::new();
        if label_names.is_empty() {
            series.insert(Vec::new(), AtomicU64::new(0));
        }

        Ok(Self {
            name: name.to_string(),
            help: help.to_string(),
            label_names: label_names.iter().map(|l| l.to_string()).collect(),
            series,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Increment by 1.
    pub fn inc(&self, values: &[&str]) -> Result<()> {
        self.add(values, 1)
    }

    /// Increment by an arbitrary amount.
    pub fn add(&self, values: &[&str], v: u64) -> Result<()> {
        let key = self.key(values)?;
        let counter = self.series.entry(key).or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
        Ok(())
    }

    /// Current value of one series; `None` if it was never incremented.
    pub fn get(&self, values: &[&str]) -> Option<u64> {
        let key = self.key(values).ok()?;
        self.series.get(&key).map(|c| c.load(Ordering::Relaxed))
    }

    /// Sum over every recorded series.
    pub fn total(&self) -> u64 {
        self.series.iter().map(|r| r.value().load(Ordering::Relaxed)).sum()
    }

    fn key(&self, values: &[&str]) -> Result<Vec<String>> {
        if values.len() != self.label_names.len() {
            return Err(PulseError::LabelMismatch {
                metric: self.name.clone(),
                expected: self.label_names.len(),
                got: values.len(),
            });
        }
        Ok(values.iter().map(|v| v.to_string()).collect())
    }

    /// Series sorted by label values so renders are byte-stable.
    fn sorted_series(&self) -> Vec<(Vec<String>, u64)> {
        let mut rows: Vec<_> = self
            .series
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort();
        rows
    }
}

impl Collector for Counter {
    fn names(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    fn encode(&self, out: &mut String) {
        encode::write_header(out, &self.name, &self.help, "counter");
        for (values, v) in self.sorted_series() {
            let labels = encode::label_set(&self.label_names, &values);
            let _ = writeln!(out, "{}{} {}", self.name, labels, v);
        }
    }
}

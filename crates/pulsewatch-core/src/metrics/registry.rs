use std::sync::Arc;

use bytes::Bytes;

use crate::error::{PulseError, Result};

/// MIME type of the text exposition format served on `/metrics`.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Anything the registry can render.
pub trait Collector: Send + Sync {
    /// Every metric family name this collector emits.
    fn names(&self) -> Vec<&str>;

    /// Append HELP/TYPE lines and samples for each family.
    fn encode(&self, out: &mut String);
}

/// Owns every collector for the process lifetime.
///
/// Registration happens once at startup (hence `&mut self`); afterwards the
/// registry is shared read-only and rendered on each scrape.
#[derive(Default)]
pub struct Registry {
    collectors: Vec<Arc<dyn Collector>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collector. Fails if any of its family names is already taken.
    pub fn register(&mut self, collector: Arc<dyn Collector>) -> Result<()> {
        for name in collector.names() {
            if self.is_registered(name) {
                return Err(PulseError::DuplicateMetric(name.to_string()));
            }
        }
        tracing::debug!(names = ?collector.names(), "collector registered");
        self.collectors.push(collector);
        Ok(())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.collectors
            .iter()
            .any(|c| c.names().iter().any(|n| *n == name))
    }

    /// Registered family names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.collectors
            .iter()
            .flat_map(|c| c.names().into_iter().map(str::to_string).collect::<Vec<_>>())
            .collect()
    }

    /// Render every collector in registration order. Always reads live state.
    pub fn render(&self) -> Bytes {
        let mut out = String::new();
        for c in &self.collectors {
            c.encode(&mut out);
        }
        Bytes::from(out)
    }
}

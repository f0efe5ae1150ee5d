//! Shared application state.
//!
//! Owns the registry and the instrument set for the process lifetime and the
//! random source used for error injection and the synthetic gauge. Handlers
//! get it through axum's `State` extractor; nothing lives in globals.

use std::sync::Arc;

use pulsewatch_core::error::Result;
use pulsewatch_core::metrics::Registry;
use pulsewatch_core::random::{RandomSource, ThreadRandom};

use crate::config::ServerConfig;
use crate::obs::metrics::AppMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServerConfig,
    registry: Registry,
    metrics: AppMetrics,
    rng: Arc<dyn RandomSource>,
}

impl AppState {
    /// Build application state with rand's thread-local generator.
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        Self::with_random(cfg, Arc::new(ThreadRandom))
    }

    /// Build application state with an injected random source.
    /// Fails if instrument registration fails.
    pub fn with_random(cfg: ServerConfig, rng: Arc<dyn RandomSource>) -> Result<Self> {
        let mut registry = Registry::new();
        let metrics = AppMetrics::register(&mut registry, &cfg.metrics)?;

        tracing::debug!(families = ?registry.names(), "metrics registered");

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry,
                metrics,
                rng,
            }),
        })
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn metrics(&self) -> &AppMetrics {
        &self.inner.metrics
    }

    pub fn rng(&self) -> Arc<dyn RandomSource> {
        Arc::clone(&self.inner.rng)
    }
}

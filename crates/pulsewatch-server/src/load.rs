//! Synthetic load generator.
//!
//! Stands in for real telemetry: every `load.interval_ms` it sets
//! `active_users` to a uniform integer in `[0, load.max_value)`. It only ever
//! writes that gauge and never touches request handling. The task stops when
//! its cancellation token fires.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use pulsewatch_core::error::{PulseError, Result};
use pulsewatch_core::metrics::Gauge;
use pulsewatch_core::random::RandomSource;

use crate::app_state::AppState;

pub struct LoadGenerator {
    gauge: Arc<Gauge>,
    rng: Arc<dyn RandomSource>,
    interval: Duration,
    max_value: u64,
}

impl LoadGenerator {
    /// Fails on a zero interval (tokio's interval cannot tick at zero).
    pub fn new(
        gauge: Arc<Gauge>,
        rng: Arc<dyn RandomSource>,
        interval: Duration,
        max_value: u64,
    ) -> Result<Self> {
        if interval.is_zero() {
            return Err(PulseError::BadConfig(
                "load generator interval must be non-zero".into(),
            ));
        }
        Ok(Self {
            gauge,
            rng,
            interval,
            max_value,
        })
    }

    /// Generator wired to `active_users` with the configured cadence.
    pub fn from_state(state: &AppState) -> Result<Self> {
        let load = &state.cfg().load;
        Self::new(
            Arc::clone(&state.metrics().active_users),
            state.rng(),
            Duration::from_millis(load.interval_ms),
            load.max_value,
        )
    }

    /// One update. Returns the value written.
    pub fn tick(&self) -> u64 {
        let v = self.rng.below(self.max_value);
        self.gauge.set(v as f64);
        v
    }

    /// Run on a background task until `cancel` fires. The first update
    /// happens one full interval after spawning.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(interval_ms = self.interval.as_millis() as u64, "load generator started");
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let v = self.tick();
                        tracing::trace!(active_users = v, "synthetic gauge updated");
                    }
                }
            }
            tracing::info!("load generator stopped");
        })
    }
}

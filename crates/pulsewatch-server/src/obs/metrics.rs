use std::sync::Arc;

use pulsewatch_core::error::Result;
use pulsewatch_core::metrics::{Counter, Gauge, Histogram, ProcessCollector, Registry};

use crate::config::MetricsSection;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_RESPONSE_TIME_SECONDS: &str = "http_response_time_seconds";
pub const ACTIVE_USERS: &str = "active_users";
pub const ERROR_RATE: &str = "error_rate";

/// Label names of `http_requests_total`, in value order.
pub const REQUEST_LABELS: [&str; 3] = ["method", "route", "status"];

pub struct AppMetrics {
    pub requests: Arc<Counter>,
    pub response_time: Arc<Histogram>,
    pub active_users: Arc<Gauge>,
    pub errors: Arc<Counter>,
}

impl AppMetrics {
    /// Build every instrument and register it (plus the process collector
    /// when enabled). Any name collision aborts startup.
    pub fn register(registry: &mut Registry, cfg: &MetricsSection) -> Result<Self> {
        let requests = Arc::new(Counter::new(
            HTTP_REQUESTS_TOTAL,
            "Total number of HTTP requests",
            &REQUEST_LABELS,
        )?);
        let response_time = Arc::new(Histogram::new(
            HTTP_RESPONSE_TIME_SECONDS,
            "HTTP response time in seconds",
            &cfg.buckets,
        )?);
        let active_users = Arc::new(Gauge::new(ACTIVE_USERS, "Number of active users")?);
        let errors = Arc::new(Counter::new(ERROR_RATE, "Number of failed requests", &[])?);

        registry.register(requests.clone())?;
        registry.register(response_time.clone())?;
        registry.register(active_users.clone())?;
        registry.register(errors.clone())?;

        if cfg.process {
            registry.register(Arc::new(ProcessCollector::new()))?;
        }

        Ok(Self {
            requests,
            response_time,
            active_users,
            errors,
        })
    }
}

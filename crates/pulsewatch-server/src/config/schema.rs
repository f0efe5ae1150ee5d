use std::net::SocketAddr;

use serde::Deserialize;
use pulsewatch_core::error::{PulseError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub load: LoadSection,

    #[serde(default)]
    pub api: ApiSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            load: LoadSection::default(),
            api: ApiSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(PulseError::UnsupportedVersion);
        }

        self.server.validate()?;
        self.load.validate()?;
        self.api.validate()?;
        self.metrics.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            PulseError::BadConfig(format!("server.listen must be a valid SocketAddr: {e}"))
        })
    }

    /// Replace the port of `listen`, keeping its host.
    pub fn apply_port_override(&mut self, port: &str) -> Result<()> {
        let port: u16 = port
            .trim()
            .parse()
            .map_err(|e| PulseError::BadConfig(format!("PORT must be a u16: {e}")))?;
        let mut addr = self.listen_addr()?;
        addr.set_port(port);
        self.listen = addr.to_string();
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadSection {
    #[serde(default = "default_load_interval_ms")]
    pub interval_ms: u64,

    /// Exclusive upper bound of the synthetic gauge value.
    #[serde(default = "default_load_max_value")]
    pub max_value: u64,
}

impl Default for LoadSection {
    fn default() -> Self {
        Self {
            interval_ms: default_load_interval_ms(),
            max_value: default_load_max_value(),
        }
    }
}

impl LoadSection {
    pub fn validate(&self) -> Result<()> {
        if !(1000..=600000).contains(&self.interval_ms) {
            return Err(PulseError::BadConfig(
                "load.interval_ms must be between 1000 and 600000".into(),
            ));
        }
        if self.max_value == 0 {
            return Err(PulseError::BadConfig("load.max_value must be > 0".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiSection {
    #[serde(default = "default_error_probability")]
    pub error_probability: f64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            error_probability: default_error_probability(),
        }
    }
}

impl ApiSection {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.error_probability) {
            return Err(PulseError::BadConfig(
                "api.error_probability must be between 0.0 and 1.0".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Upper bounds (seconds) of the response-time histogram.
    #[serde(default = "default_buckets")]
    pub buckets: Vec<f64>,

    /// Export process_* default metrics.
    #[serde(default = "default_process")]
    pub process: bool,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            buckets: default_buckets(),
            process: default_process(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        if self.buckets.is_empty() {
            return Err(PulseError::BadConfig("metrics.buckets must not be empty".into()));
        }
        if self.buckets.iter().any(|b| !b.is_finite() || *b <= 0.0) {
            return Err(PulseError::BadConfig(
                "metrics.buckets must be finite and positive".into(),
            ));
        }
        if self.buckets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(PulseError::BadConfig(
                "metrics.buckets must be strictly ascending".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:3000".into()
}
fn default_load_interval_ms() -> u64 {
    5000
}
fn default_load_max_value() -> u64 {
    100
}
fn default_error_probability() -> f64 {
    0.1
}
fn default_buckets() -> Vec<f64> {
    vec![0.1, 0.5, 1.0, 2.0, 5.0]
}
fn default_process() -> bool {
    true
}

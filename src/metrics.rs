//! Metrics bootstrap with StatsD line rendering.
//!
//! The global handler defaults to logging each metric; call [`bootstrap`]
//! once at startup to route metrics elsewhere.
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};

use once_cell::sync::Lazy;
use tracing::info;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq)]
pub enum Metric {
    Timer { name: String, millis: f64 },
    Counter { name: String, value: i64 },
    Gauge { name: String, value: f64, op: GaugeOp },
}

/// StatsD gauges are absolute unless signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GaugeOp {
    #[default]
    Set,
    Increase,
    Decrease,
}

pub trait MetricsHandler: Send + Sync {
    fn record(&self, metric: &Metric);
}

/// Writes every metric as a log event.
#[derive(Debug, Default)]
pub struct LoggerMetricsHandler;

/// Keeps StatsD lines in memory until flushed.
#[derive(Debug, Default)]
pub struct BufferedStatsdHandler {
    lines: Mutex<Vec<String>>,
}

static GLOBAL: Lazy<RwLock<Arc<dyn MetricsHandler>>> = Lazy::new(|| {
    let handler: Arc<dyn MetricsHandler> = Arc::new(LoggerMetricsHandler);
    RwLock::new(handler)
});

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Metric {
    pub fn timer(name: impl Into<String>, millis: f64) -> Self {
        Metric::Timer { name: name.into(), millis }
    }

    pub fn counter(name: impl Into<String>, value: i64) -> Self {
        Metric::Counter { name: name.into(), value }
    }

    pub fn gauge(name: impl Into<String>, value: f64, op: GaugeOp) -> Self {
        Metric::Gauge { name: name.into(), value, op }
    }

    pub fn name(&self) -> &str {
        match self {
            Metric::Timer { name, .. } | Metric::Counter { name, .. } | Metric::Gauge { name, .. } => name,
        }
    }

    /// StatsD wire form.
    ///
    /// A signed gauge value means "adjust", so setting a gauge below zero is
    /// sent as a reset to 0 followed by the negative delta (two lines).
    pub fn statsd_line(&self) -> String {
        match self {
            Metric::Timer { name, millis } => format!("{name}:{millis}|ms"),
            Metric::Counter { name, value } => format!("{name}:{value}|c"),
            Metric::Gauge { name, value, op: GaugeOp::Set } if *value < 0.0 => {
                format!("{name}:0|g\n{name}:{value}|g")
            }
            Metric::Gauge { name, value, op } => format!("{name}:{op}{value}|g"),
        }
    }
}

impl fmt::Display for GaugeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GaugeOp::Set => "",
            GaugeOp::Increase => "+",
            GaugeOp::Decrease => "-",
        })
    }
}

impl MetricsHandler for LoggerMetricsHandler {
    fn record(&self, metric: &Metric) {
        info!(metric = %metric.name(), line = %metric.statsd_line(), "metric");
    }
}

impl BufferedStatsdHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain buffered lines as one newline-separated StatsD payload.
    pub fn flush(&self) -> String {
        let mut lines = self.lines.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let payload = lines.join("\n");
        lines.clear();
        payload
    }
}

impl MetricsHandler for BufferedStatsdHandler {
    fn record(&self, metric: &Metric) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(metric.statsd_line());
    }
}

/// Replace the global handler. Intended to run before the service starts.
pub fn bootstrap(handler: Arc<dyn MetricsHandler>) {
    *GLOBAL.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = handler;
}

pub fn global() -> Arc<dyn MetricsHandler> {
    GLOBAL.read().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
}

pub fn record(metric: Metric) {
    global().record(&metric);
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statsd_lines() {
        assert_eq!(Metric::timer("db.query", 12.5).statsd_line(), "db.query:12.5|ms");
        assert_eq!(Metric::counter("hits", 3).statsd_line(), "hits:3|c");
        assert_eq!(Metric::gauge("pool", 7.0, GaugeOp::Set).statsd_line(), "pool:7|g");
        assert_eq!(Metric::gauge("pool", 2.0, GaugeOp::Increase).statsd_line(), "pool:+2|g");
        assert_eq!(Metric::gauge("pool", 1.5, GaugeOp::Decrease).statsd_line(), "pool:-1.5|g");
    }

    #[test]
    fn negative_absolute_gauge_resets_first() {
        assert_eq!(Metric::gauge("temp", -3.0, GaugeOp::Set).statsd_line(), "temp:0|g\ntemp:-3|g");
        assert_eq!(Metric::gauge("temp", 0.0, GaugeOp::Set).statsd_line(), "temp:0|g");
    }

    #[test]
    fn buffered_handler_flushes_in_order() {
        let handler = BufferedStatsdHandler::new();
        handler.record(&Metric::counter("a", 1));
        handler.record(&Metric::timer("b", 2.0));
        assert_eq!(handler.flush(), "a:1|c\nb:2|ms");
        assert_eq!(handler.flush(), "");
    }

    #[test]
    fn bootstrap_replaces_global_handler() {
        let handler = Arc::new(BufferedStatsdHandler::new());
        bootstrap(handler.clone());
        record(Metric::counter("global.hits", 1));
        assert!(handler.flush().contains("global.hits:1|c"));
        bootstrap(Arc::new(LoggerMetricsHandler));
    }
}

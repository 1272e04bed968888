//! Prometheus metrics for ai-service.
//!
//! HTTP request metrics flow through the `metrics` facade into the
//! `metrics-exporter-prometheus` recorder; AI-specific metrics live in a
//! dedicated `prometheus` registry. `render` concatenates both.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();
static AI_METRICS: OnceLock<AiMetrics> = OnceLock::new();

struct AiMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    provider_latency_seconds: HistogramVec,
    provider_errors_total: IntCounterVec,
    tokens_total: IntCounterVec,
}

impl AiMetrics {
    fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Pipeline outcomes per request kind
        let requests_total = IntCounterVec::new(
            Opts::new("ai_requests_total", "Total AI pipeline requests"),
            &["kind", "outcome"],
        )?;

        let provider_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "ai_provider_latency_seconds",
                "Text-generation backend latency in seconds",
            )
            .buckets(vec![0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]),
            &["provider"],
        )?;

        let provider_errors_total = IntCounterVec::new(
            Opts::new("ai_provider_errors_total", "Total text-generation backend errors"),
            &["provider", "error_type"],
        )?;

        // type: input, output
        let tokens_total = IntCounterVec::new(
            Opts::new("ai_tokens_total", "Total tokens processed"),
            &["model", "type"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(provider_latency_seconds.clone()))?;
        registry.register(Box::new(provider_errors_total.clone()))?;
        registry.register(Box::new(tokens_total.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            provider_latency_seconds,
            provider_errors_total,
            tokens_total,
        })
    }
}

/// Initialize metrics collection. Safe to call more than once; only the first
/// call installs the global recorder.
pub fn init_metrics() {
    METRICS_HANDLE.get_or_init(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "Prometheus recorder not installed");
            None
        }
    });

    ai_metrics();
}

fn ai_metrics() -> Option<&'static AiMetrics> {
    if let Some(metrics) = AI_METRICS.get() {
        return Some(metrics);
    }

    match AiMetrics::new() {
        Ok(metrics) => Some(AI_METRICS.get_or_init(|| metrics)),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create AI metrics");
            None
        }
    }
}

/// Get metrics output in Prometheus text format.
pub fn render() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .and_then(|handle| handle.as_ref())
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string());

    if let Some(metrics) = AI_METRICS.get() {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&metrics.registry.gather(), &mut buffer).ok();
        if let Ok(custom_metrics) = String::from_utf8(buffer) {
            output.push_str(&custom_metrics);
        }
    }

    output
}

/// Record the outcome of one pipeline run.
pub fn record_request(kind: &str, outcome: &str) {
    if let Some(metrics) = ai_metrics() {
        metrics
            .requests_total
            .with_label_values(&[kind, outcome])
            .inc();
    }
}

/// Record backend latency.
pub fn record_provider_latency(provider: &str, seconds: f64) {
    if let Some(metrics) = ai_metrics() {
        metrics
            .provider_latency_seconds
            .with_label_values(&[provider])
            .observe(seconds);
    }
}

/// Record a backend error.
pub fn record_provider_error(provider: &str, error_type: &str) {
    if let Some(metrics) = ai_metrics() {
        metrics
            .provider_errors_total
            .with_label_values(&[provider, error_type])
            .inc();
    }
}

/// Record token usage.
pub fn record_tokens(model: &str, input_tokens: u32, output_tokens: u32) {
    if let Some(metrics) = ai_metrics() {
        metrics
            .tokens_total
            .with_label_values(&[model, "input"])
            .inc_by(u64::from(input_tokens));
        metrics
            .tokens_total
            .with_label_values(&[model, "output"])
            .inc_by(u64::from(output_tokens));
    }
}

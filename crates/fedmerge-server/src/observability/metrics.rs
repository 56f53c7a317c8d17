//! Prometheus metrics infrastructure.
//!
//! The merge engine records through the `metrics` facade; this module installs
//! the `metrics-exporter-prometheus` recorder and describes what it collects.
//!
//! # Metrics Exposed
//!
//! - `fedmerge_merge_calls_total` - Successful merge calls
//! - `fedmerge_merge_inputs_total` - Caller documents merged
//! - `fedmerge_merge_duplicates_total` - Inputs folded into an earlier group
//! - `fedmerge_fingerprint_collisions_total` - Equal fingerprints over different bytes
//! - `fedmerge_merge_groups` - Output groups per merge call

use std::sync::Arc;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Shared state containing the Prometheus handle for metrics rendering.
#[derive(Clone)]
pub struct MetricsState {
    handle: Arc<PrometheusHandle>,
}

impl MetricsState {
    /// Creates a new metrics state with the given Prometheus handle.
    pub fn new(handle: PrometheusHandle) -> Self {
        Self {
            handle: Arc::new(handle),
        }
    }

    /// Renders the current metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Error type for metrics initialization.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("failed to install Prometheus recorder: recorder already installed")]
    AlreadyInstalled,
}

/// Initializes the Prometheus metrics recorder.
///
/// This must be called once at startup before any merge runs. Returns a
/// handle that can be used to render metrics.
///
/// # Errors
///
/// Returns an error if a recorder is already installed.
pub fn init_metrics() -> Result<MetricsState, MetricsError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|_| MetricsError::AlreadyInstalled)?;

    register_merge_metrics();

    Ok(MetricsState::new(handle))
}

/// Describes the metrics recorded by the merge engine.
pub fn register_merge_metrics() {
    metrics::describe_counter!(
        "fedmerge_merge_calls_total",
        "Total number of successful batch merge calls"
    );
    metrics::describe_counter!(
        "fedmerge_merge_inputs_total",
        "Total number of caller documents merged"
    );
    metrics::describe_counter!(
        "fedmerge_merge_duplicates_total",
        "Total number of inputs folded into an earlier output group"
    );
    metrics::describe_counter!(
        "fedmerge_fingerprint_collisions_total",
        "Total number of fingerprint matches over different representation bytes"
    );
    metrics::describe_histogram!(
        "fedmerge_merge_groups",
        "Number of output groups produced per merge call"
    );
}

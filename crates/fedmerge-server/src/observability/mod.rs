//! Observability infrastructure for fedmerge.
//!
//! This module provides:
//! - Structured logging configuration
//! - Prometheus metrics for the merge engine

mod logging;
mod metrics;

pub use self::logging::{create_json_layer, init_logging, parse_log_level, LoggingConfig};
pub use self::metrics::{init_metrics, register_merge_metrics, MetricsError, MetricsState};

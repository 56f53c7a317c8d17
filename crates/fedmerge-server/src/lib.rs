//! fedmerge-server: Gateway plumbing around the merge engine
//!
//! This crate contains the pieces a gateway process needs around
//! `fedmerge-core`:
//! - Configuration management
//! - Structured logging and Prometheus metrics
//! - Cancellation registry for subscription operations
//! - The `fedmerge` command-line merger
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              fedmerge-server                │
//! ├─────────────────────────────────────────────┤
//! │  config.rs       - Configuration management │
//! │  observability/  - Logging and metrics      │
//! │  subscription/   - Cancellation registry    │
//! │  main.rs         - CLI entry point          │
//! └─────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod observability;
pub mod subscription;

// Re-exports for convenience
pub use config::{ConfigLoadError, GatewayConfig};
pub use subscription::SubscriptionCancellations;

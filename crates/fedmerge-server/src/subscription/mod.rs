//! Lifecycle management for long-lived subscription operations.
//!
//! Each subscription started by the gateway registers a cancellation token
//! under its operation id. Stopping one subscription, or tearing down the
//! connection that owns all of them, cancels the matching tokens.

mod cancellations;

pub use cancellations::SubscriptionCancellations;

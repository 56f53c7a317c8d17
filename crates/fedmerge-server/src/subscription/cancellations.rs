//! Cancellation registry keyed by subscription operation id.

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Registry of cancellation tokens for in-flight subscriptions.
///
/// Safe for concurrent use: registration and cancellation go through
/// DashMap's sharded locks, and tokens can be awaited from any task.
#[derive(Debug, Default)]
pub struct SubscriptionCancellations {
    tokens: DashMap<String, CancellationToken>,
}

impl SubscriptionCancellations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `id` and returns the token its operation should watch.
    ///
    /// If `id` is already registered, the previous token is cancelled and
    /// replaced.
    pub fn add(&self, id: impl Into<String>) -> CancellationToken {
        let id = id.into();
        let token = CancellationToken::new();

        if let Some(previous) = self.tokens.insert(id.clone(), token.clone()) {
            debug!(id = %id, "replacing subscription registration");
            previous.cancel();
        }

        token
    }

    /// Cancels and removes `id`. Returns `false` if it was not registered.
    pub fn cancel(&self, id: &str) -> bool {
        match self.tokens.remove(id) {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancels every registered subscription and empties the registry.
    pub fn cancel_all(&self) {
        let mut cancelled = 0usize;
        self.tokens.retain(|_, token| {
            token.cancel();
            cancelled += 1;
            false
        });
        debug!(cancelled, "cancelled all subscriptions");
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tokens.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

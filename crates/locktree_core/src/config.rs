//! Engine configuration.

/// Order in which pending requests are queued and scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulingPolicy {
    /// New requests are prepended and the queue is scanned front to back.
    ///
    /// For two requests on the same path the most recently issued one is
    /// evaluated first. A long-waiting request can keep losing to newer,
    /// non-conflicting ones.
    #[default]
    MostRecentFirst,

    /// New requests are appended and scanned in arrival order.
    ///
    /// A request that cannot be granted reserves its region for the rest of
    /// the pass, so a later conflicting request never overtakes it.
    /// Non-conflicting later requests are still granted.
    Fifo,
}

/// Configuration for a [`LockEngine`](crate::LockEngine).
#[derive(Debug, Clone)]
pub struct LockConfig {
    /// Queue ordering policy.
    pub policy: SchedulingPolicy,

    /// Label recorded on tracing events emitted by the engine.
    pub name: String,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            policy: SchedulingPolicy::MostRecentFirst,
            name: "locks".to_string(),
        }
    }
}

impl LockConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scheduling policy.
    #[must_use]
    pub fn policy(mut self, policy: SchedulingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the engine label.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = LockConfig::default();
        assert_eq!(config.policy, SchedulingPolicy::MostRecentFirst);
        assert_eq!(config.name, "locks");
    }

    #[test]
    fn builder_pattern() {
        let config = LockConfig::new()
            .policy(SchedulingPolicy::Fifo)
            .name("entities");

        assert_eq!(config.policy, SchedulingPolicy::Fifo);
        assert_eq!(config.name, "entities");
    }
}

//! Pool configuration.

use std::time::Duration;

use crate::error::PoolError;

/// Tunables for a [`PolicyPool`](crate::pool::pool::PolicyPool).
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Optional run/session name, prefixed onto every actor's identity so
    /// concurrent pools stay distinguishable in logs and backends.
    pub run_name: Option<String>,
    /// Bounded wait used by each worker when polling its command channel.
    /// An interrupt is observed within one polling period even while the
    /// worker is idle.
    pub polling_period: Duration,
    /// Reset an actor transparently when a step ends its episode,
    /// preserving the terminal observation in the step info.
    pub auto_reset: bool,
    /// How long `close` waits per worker for the shutdown acknowledgement
    /// before detaching an unresponsive thread.
    pub close_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            run_name: None,
            polling_period: Duration::from_millis(100),
            auto_reset: true,
            close_timeout: Duration::from_secs(5),
        }
    }
}

impl PoolConfig {
    /// Set the run/session name.
    pub fn with_run_name(mut self, name: impl Into<String>) -> Self {
        self.run_name = Some(name.into());
        self
    }

    /// Set the worker polling period.
    pub fn with_polling_period(mut self, period: Duration) -> Self {
        self.polling_period = period;
        self
    }

    /// Enable or disable auto-reset.
    pub fn with_auto_reset(mut self, auto_reset: bool) -> Self {
        self.auto_reset = auto_reset;
        self
    }

    /// Set the per-worker close timeout.
    pub fn with_close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = timeout;
        self
    }

    /// Check the config before any worker is spawned.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.polling_period.is_zero() {
            return Err(PoolError::Configuration(
                "polling_period must be non-zero".to_string(),
            ));
        }
        if self.close_timeout.is_zero() {
            return Err(PoolError::Configuration(
                "close_timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Actor name for the worker at `index`, e.g. `"tag_policy_0"` under
    /// run name `"tag"`, or `"policy_0"` without one.
    pub fn actor_name(&self, index: usize) -> String {
        match &self.run_name {
            Some(run) => format!("{}_policy_{}", run, index),
            None => format!("policy_{}", index),
        }
    }
}

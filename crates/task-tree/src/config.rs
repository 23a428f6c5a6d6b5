//! Runner configuration and loaders.
use std::env;
use std::time::Duration;

/// Settings for [`TreeRunner`](crate::TreeRunner).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Pause between two ticks that left the root running.
    ///
    /// Zero ticks back to back.
    pub tick_interval: Duration,
    /// Ticks allowed for a single run before it is cancelled.
    pub max_ticks: Option<u64>,
}

impl RunnerConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `TASK_TREE_TICK_INTERVAL_MS` - Pause between ticks (default: 0)
    /// - `TASK_TREE_MAX_TICKS` - Tick budget per run (default: unbounded)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(millis) = read_env::<u64>("TASK_TREE_TICK_INTERVAL_MS") {
            config.tick_interval = Duration::from_millis(millis);
        }

        // Zero is treated as "no limit" rather than a run that can never tick.
        config.max_ticks = read_env::<u64>("TASK_TREE_MAX_TICKS").filter(|&ticks| ticks > 0);

        config
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ticks_back_to_back_without_limit() {
        let config = RunnerConfig::default();
        assert_eq!(config.tick_interval, Duration::ZERO);
        assert_eq!(config.max_ticks, None);
    }

    #[test]
    fn builders_set_fields() {
        let config = RunnerConfig::default()
            .with_tick_interval(Duration::from_millis(5))
            .with_max_ticks(10);
        assert_eq!(config.tick_interval, Duration::from_millis(5));
        assert_eq!(config.max_ticks, Some(10));
    }
}

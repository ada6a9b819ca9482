//! # Bus configuration.
//!
//! Provides [`Config`], the settings shared by every [`Bus`](crate::Bus) an
//! application creates.
//!
//! Config is used in two ways:
//! 1. **Standalone bus**: `Bus::new(config)`
//! 2. **Application**: `Application::builder(config)` hands a copy to each of its three buses
//!
//! ## Sentinel values
//! - `log_capacity = 0` → unbounded log (kept until `clear_log` / `destroy`)

/// Settings for one bus.
///
/// ## Field semantics
/// - `record_log`: append every publish to the event log
/// - `log_capacity`: keep at most this many log entries, oldest dropped first (`0` = unbounded)
/// - `trace_unmatched`: emit a `debug` line when a publish reaches no subscriber
///
/// ## Notes
/// All fields are public. Prefer the helper accessors to avoid sprinkling
/// sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Whether publishes are recorded in the event log.
    pub record_log: bool,

    /// Maximum number of log entries retained.
    ///
    /// - `0` = unbounded
    /// - `n > 0` = only the `n` most recent events are kept
    pub log_capacity: usize,

    /// Log (at `debug`) publishes that matched no subscriber.
    pub trace_unmatched: bool,
}

impl Config {
    /// Returns the log bound as an `Option`.
    ///
    /// - `None` → unbounded
    /// - `Some(n)` → at most `n` entries
    #[inline]
    pub fn log_limit(&self) -> Option<usize> {
        if self.log_capacity == 0 {
            None
        } else {
            Some(self.log_capacity)
        }
    }

    /// Configuration with the event log switched off.
    pub fn without_log() -> Self {
        Self {
            record_log: false,
            ..Self::default()
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `record_log = true`
    /// - `log_capacity = 0` (unbounded)
    /// - `trace_unmatched = false`
    fn default() -> Self {
        Self {
            record_log: true,
            log_capacity: 0,
            trace_unmatched: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_limit_sentinel() {
        assert_eq!(Config::default().log_limit(), None);
        let cfg = Config {
            log_capacity: 8,
            ..Config::default()
        };
        assert_eq!(cfg.log_limit(), Some(8));
    }

    #[test]
    fn without_log_disables_recording() {
        let cfg = Config::without_log();
        assert!(!cfg.record_log);
        assert_eq!(cfg.log_capacity, 0);
    }
}

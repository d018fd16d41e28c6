//! # Runtime configuration.
//!
//! Provides [`Config`], the centralized settings for the tag lifecycle
//! manager. The configuration surface that *produces* these values (settings
//! UI, persistence) lives outside this crate; callers hand a `Config` to
//! [`TagManager::builder`](crate::TagManager::builder) at construction and
//! may push changes later through
//! [`TagManager::apply_config`](crate::TagManager::apply_config).
//!
//! ## Sentinel values
//! - `ttl = 0` while `ttl_enabled` → treated as disabled (no timers armed)
//! - `bus_capacity` is clamped to a minimum of 1 by the bus

use std::time::Duration;

/// Configuration for the tag lifecycle manager.
///
/// ## Field semantics
/// - `ttl`: how long an untouched tag survives before eviction
/// - `ttl_enabled`: master switch for expiry timers
/// - `enabled`: master switch for the whole feature; when false, incoming
///   events are dropped and a transition to false clears the registry
/// - `icon_timeout`: bounded wait for icon resolution before falling back
/// - `bus_capacity`: directive bus ring buffer size (min 1; clamped by Bus)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to
/// avoid sprinkling sentinel checks (`ttl = 0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Time-to-live for an untouched tag.
    ///
    /// Every merged event re-arms the tag's expiry with this duration.
    /// `Duration::ZERO` is equivalent to `ttl_enabled = false`.
    pub ttl: Duration,

    /// Whether expiry timers are armed at all.
    ///
    /// When false, tags live until manually dismissed or globally cleared.
    pub ttl_enabled: bool,

    /// Whether the feature is enabled.
    ///
    /// When false, [`handle_event`](crate::TagManager::handle_event) drops
    /// every event; switching from true to false clears all live tags.
    pub enabled: bool,

    /// Bounded wait for icon resolution.
    ///
    /// A fetch that does not settle within this window resolves to the
    /// fallback marker, permanently for that domain.
    pub icon_timeout: Duration,

    /// Capacity of the directive bus broadcast ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` directives
    /// will receive `Lagged` and skip older items. Minimum value is 1.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the effective TTL as an `Option`.
    ///
    /// - `None` → no eviction (disabled, or duration is zero)
    /// - `Some(d)` → untouched tags are evicted after `d`
    #[inline]
    pub fn effective_ttl(&self) -> Option<Duration> {
        if self.ttl_enabled && self.ttl > Duration::ZERO {
            Some(self.ttl)
        } else {
            None
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `ttl = 5s` (documented fallback for missing/invalid settings)
    /// - `ttl_enabled = true`
    /// - `enabled = true`
    /// - `icon_timeout = 3s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            ttl: Duration::from_millis(5000),
            ttl_enabled: true,
            enabled: true,
            icon_timeout: Duration::from_secs(3),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_ttl_is_equivalent_to_disabled() {
        let cfg = Config {
            ttl: Duration::ZERO,
            ttl_enabled: true,
            ..Config::default()
        };
        assert_eq!(cfg.effective_ttl(), None);
    }

    #[test]
    fn disabled_ttl_wins_over_duration() {
        let cfg = Config {
            ttl: Duration::from_secs(10),
            ttl_enabled: false,
            ..Config::default()
        };
        assert_eq!(cfg.effective_ttl(), None);
    }

    #[test]
    fn enabled_ttl_passes_through() {
        let cfg = Config::default();
        assert_eq!(cfg.effective_ttl(), Some(Duration::from_millis(5000)));
    }
}

//! Off-route hysteresis and reroute cooldown.
//!
//! A position must stay beyond the off-route threshold for a dwell period
//! before a reroute is requested, and consecutive reroutes are spaced by a
//! cooldown. The decision is a pure function of its inputs.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReroutePolicy {
    /// Distances at or below this count as on-route.
    pub off_route_threshold_m: f64,
    pub dwell_ms: i64,
    pub cooldown_ms: i64,
}

impl Default for ReroutePolicy {
    fn default() -> Self {
        Self {
            off_route_threshold_m: 40.0,
            dwell_ms: 6_000,
            cooldown_ms: 12_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReroutePolicyResult {
    pub trigger: bool,
    pub new_off_route_since: Option<DateTime<Utc>>,
}

impl ReroutePolicy {
    pub fn should_reroute(
        &self,
        off_distance_m: f64,
        off_route_since: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        last_reroute_at: Option<DateTime<Utc>>,
    ) -> ReroutePolicyResult {
        if off_distance_m <= self.off_route_threshold_m {
            return ReroutePolicyResult {
                trigger: false,
                new_off_route_since: None,
            };
        }

        let Some(since) = off_route_since else {
            return ReroutePolicyResult {
                trigger: false,
                new_off_route_since: Some(now),
            };
        };

        let dwelled = now - since >= TimeDelta::milliseconds(self.dwell_ms);
        let cooled = last_reroute_at
            .is_none_or(|last| now - last >= TimeDelta::milliseconds(self.cooldown_ms));

        ReroutePolicyResult {
            trigger: dwelled && cooled,
            new_off_route_since: Some(since),
        }
    }
}

/// [`ReroutePolicy::should_reroute`] with the default thresholds.
pub fn should_reroute(
    off_distance_m: f64,
    off_route_since: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    last_reroute_at: Option<DateTime<Utc>>,
) -> ReroutePolicyResult {
    ReroutePolicy::default().should_reroute(off_distance_m, off_route_since, now, last_reroute_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn on_route_clears_timer() {
        let r = should_reroute(40.0, Some(t(0)), t(30), None);
        assert!(!r.trigger);
        assert_eq!(r.new_off_route_since, None);
    }

    #[test]
    fn first_detection_starts_timer_without_trigger() {
        let r = should_reroute(41.0, None, t(5), None);
        assert!(!r.trigger);
        assert_eq!(r.new_off_route_since, Some(t(5)));
    }

    #[test]
    fn dwell_boundary_is_inclusive() {
        let r = should_reroute(80.0, Some(t(0)), t(6), None);
        assert!(r.trigger);
        assert_eq!(r.new_off_route_since, Some(t(0)));
    }

    #[test]
    fn cooldown_boundary_is_inclusive() {
        let blocked = should_reroute(80.0, Some(t(0)), t(20), Some(t(9)));
        assert!(!blocked.trigger);
        let allowed = should_reroute(80.0, Some(t(0)), t(21), Some(t(9)));
        assert!(allowed.trigger);
    }

    #[test]
    fn custom_thresholds_apply() {
        let p = ReroutePolicy {
            off_route_threshold_m: 10.0,
            dwell_ms: 1_000,
            cooldown_ms: 0,
        };
        assert!(p.should_reroute(11.0, Some(t(0)), t(1), Some(t(1))).trigger);
    }
}

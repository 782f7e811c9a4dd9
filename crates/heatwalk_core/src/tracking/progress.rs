//! Step advancement, remaining distance and ETA.

use serde::{Deserialize, Serialize};

use crate::geo::{FALLBACK_WALKING_MPS, haversine_m, length_between};
use crate::model::{Route, SnapResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressOptions {
    /// Advance to the next step once the current one has less than this left.
    pub step_advance_m: f64,
    /// Lower bound for the average-speed ETA estimate.
    pub min_speed_mps: f64,
    /// Pace assumed when a route carries no duration at all.
    pub fallback_speed_mps: f64,
}

impl Default for ProgressOptions {
    fn default() -> Self {
        Self {
            step_advance_m: 12.0,
            min_speed_mps: 0.5,
            fallback_speed_mps: FALLBACK_WALKING_MPS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub step_index: usize,
    pub step_remaining_m: f64,
    pub total_remaining_m: f64,
    pub eta_s: f64,
}

pub fn advance(route: &Route, step_index: usize, snap: &SnapResult) -> Progress {
    advance_with(route, step_index, snap, ProgressOptions::default())
}

pub fn advance_with(
    route: &Route,
    step_index: usize,
    snap: &SnapResult,
    opts: ProgressOptions,
) -> Progress {
    let total_remaining_m = (route.distance_m - snap.traveled_m).max(0.0);

    let mut step = step_index.min(route.last_step());
    let mut step_remaining_m = step_remaining(route, step, snap);

    // One step per update, never more.
    if step_remaining_m < opts.step_advance_m && step < route.last_step() {
        step += 1;
        step_remaining_m = step_remaining(route, step, snap);
    }

    let eta_s = estimate_eta(route, step, step_remaining_m, total_remaining_m, opts);

    Progress {
        step_index: step,
        step_remaining_m,
        total_remaining_m,
        eta_s,
    }
}

/// Meters from the snapped point to the end vertex of instruction `step`.
///
/// Zero once the snapped point lies past that end vertex.
pub fn step_remaining(route: &Route, step: usize, snap: &SnapResult) -> f64 {
    let Some(instr) = route.instructions.get(step) else {
        return 0.0;
    };
    let end = instr.vertex_interval.1;
    let next = snap.next_vertex_index;

    if next > end {
        return 0.0;
    }
    let Some(&next_vertex) = route.polyline.get(next) else {
        return 0.0;
    };

    length_between(&route.polyline, next, end) + haversine_m(snap.closest, next_vertex)
}

fn estimate_eta(
    route: &Route,
    step: usize,
    step_remaining_m: f64,
    total_remaining_m: f64,
    opts: ProgressOptions,
) -> f64 {
    let timed: f64 = route.instructions.iter().map(|i| i.duration_ms).sum();

    if timed > 0.0 {
        let current = &route.instructions[step];
        let current_s = if current.distance_m > 0.0 {
            let frac = (step_remaining_m / current.distance_m).clamp(0.0, 1.0);
            frac * current.duration_ms / 1000.0
        } else {
            0.0
        };
        let later_s: f64 = route.instructions[step + 1..]
            .iter()
            .map(|i| i.duration_ms / 1000.0)
            .sum();
        return current_s + later_s;
    }

    let speed = if route.duration_s > 0.0 && route.distance_m > 0.0 {
        route.distance_m / route.duration_s
    } else {
        opts.fallback_speed_mps
    };
    total_remaining_m / speed.max(opts.min_speed_mps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::straight_line_route;
    use crate::model::Position;
    use crate::tracking::line_tracker::snap;

    #[test]
    fn total_remaining_never_goes_negative() {
        let route = straight_line_route(Position::new(0.0, 0.0), Position::new(0.001, 0.0));
        let mut s = snap(&route, route.polyline[1]);
        s.traveled_m = route.distance_m + 50.0;
        let p = advance(&route, 0, &s);
        assert_eq!(p.total_remaining_m, 0.0);
    }

    #[test]
    fn eta_falls_back_to_average_speed_without_instruction_times() {
        let mut route = straight_line_route(Position::new(0.0, 0.0), Position::new(0.01, 0.0));
        route.duration_s = route.distance_m / 1.25;
        let s = snap(&route, route.polyline[0]);
        let p = advance(&route, 0, &s);
        assert!((p.eta_s - route.distance_m / 1.25).abs() < 1e-6);
    }

    #[test]
    fn average_speed_is_floored() {
        let mut route = straight_line_route(Position::new(0.0, 0.0), Position::new(0.01, 0.0));
        // 0.1 m/s is slower than the floor
        route.duration_s = route.distance_m / 0.1;
        let s = snap(&route, route.polyline[0]);
        let p = advance(&route, 0, &s);
        assert!((p.eta_s - route.distance_m / 0.5).abs() < 1e-6);
    }

    #[test]
    fn eta_uses_instruction_times_when_present() {
        let mut route = straight_line_route(Position::new(0.0, 0.0), Position::new(0.01, 0.0));
        route.instructions[0].duration_ms = 600_000.0;
        let s = snap(&route, route.polyline[0]);
        let p = advance(&route, 0, &s);
        assert!((p.eta_s - 600.0).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_step_index_is_clamped() {
        let route = straight_line_route(Position::new(0.0, 0.0), Position::new(0.01, 0.0));
        let s = snap(&route, route.polyline[0]);
        let p = advance(&route, 99, &s);
        assert_eq!(p.step_index, route.last_step());
    }
}

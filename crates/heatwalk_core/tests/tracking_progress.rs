mod common;

use crate::common::{east_of, east_route};
use heatwalk_core::Position;
use heatwalk_core::tracking::{advance, snap};

fn start() -> Position {
    Position::new(-97.743, 30.267)
}

#[test]
fn walking_the_route_visits_each_step_once() {
    let route = east_route(start(), &[100.0, 200.0, 150.0]);

    let mut step = 0;
    let mut visited = vec![0];
    for along in (0..=450).step_by(5) {
        let s = snap(&route, east_of(start(), along as f64, 0.0));
        let p = advance(&route, step, &s);
        assert!(p.step_index >= step, "step went backwards at {along} m");
        step = p.step_index;
        if visited.last() != Some(&step) {
            visited.push(step);
        }
    }

    assert_eq!(visited, vec![0, 1, 2]);
}

#[test]
fn steps_advance_within_the_threshold_of_their_end() {
    let route = east_route(start(), &[100.0, 200.0, 150.0]);

    let s = snap(&route, east_of(start(), 85.0, 0.0));
    assert_eq!(advance(&route, 0, &s).step_index, 0);

    let s = snap(&route, east_of(start(), 90.0, 0.0));
    let p = advance(&route, 0, &s);
    assert_eq!(p.step_index, 1);
    // remaining distance is reported for the new step
    assert!((p.step_remaining_m - 210.0).abs() < 0.5, "{}", p.step_remaining_m);
}

#[test]
fn a_jump_ahead_advances_only_one_step() {
    let route = east_route(start(), &[100.0, 200.0, 150.0]);

    let s = snap(&route, east_of(start(), 400.0, 0.0));
    let p = advance(&route, 0, &s);
    assert_eq!(p.step_index, 1);
    assert_eq!(p.step_remaining_m, 0.0);

    let p = advance(&route, p.step_index, &s);
    assert_eq!(p.step_index, 2);
    assert!((p.step_remaining_m - 50.0).abs() < 0.5);
}

#[test]
fn remaining_distance_and_eta_shrink_along_the_route() {
    let route = east_route(start(), &[100.0, 200.0, 150.0]);

    let mut step = 0;
    let mut last_remaining = f64::INFINITY;
    let mut last_eta = f64::INFINITY;
    for along in [0.0, 50.0, 150.0, 300.0, 449.0] {
        let s = snap(&route, east_of(start(), along, 0.0));
        let p = advance(&route, step, &s);
        step = p.step_index;

        assert!(p.total_remaining_m <= last_remaining);
        assert!(p.eta_s <= last_eta);
        assert!(p.eta_s >= 0.0);
        last_remaining = p.total_remaining_m;
        last_eta = p.eta_s;
    }
    assert!(last_remaining < 2.0);
}

#[test]
fn stale_step_index_is_clamped_after_route_change() {
    let route = east_route(start(), &[100.0, 100.0]);
    let s = snap(&route, east_of(start(), 20.0, 0.0));

    let p = advance(&route, 9, &s);
    assert_eq!(p.step_index, 1);
}

//! Distance helpers on the sphere and in a local planar frame.
//!
//! Great-circle distances use the haversine formula. Projection onto a
//! segment uses a flat frame in meters scaled around the segment's mean
//! latitude, which is accurate enough at walking scale.

use crate::model::{Instruction, Position, Route, TurnSign};

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;
pub const M_PER_DEG_LAT: f64 = 110_540.0;
pub const M_PER_DEG_LNG_EQUATOR: f64 = 111_320.0;

/// Great-circle distance in meters.
pub fn haversine_m(a: Position, b: Position) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let s = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * s.sqrt().min(1.0).asin()
}

/// Point in a local planar frame, meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Xy {
    pub x: f64,
    pub y: f64,
}

impl Xy {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

pub fn add(a: Xy, b: Xy) -> Xy {
    Xy::new(a.x + b.x, a.y + b.y)
}
pub fn sub(a: Xy, b: Xy) -> Xy {
    Xy::new(a.x - b.x, a.y - b.y)
}
pub fn mul(a: Xy, k: f64) -> Xy {
    Xy::new(a.x * k, a.y * k)
}
pub fn dot(a: Xy, b: Xy) -> f64 {
    a.x * b.x + a.y * b.y
}
pub fn norm2(a: Xy) -> f64 {
    dot(a, a)
}
pub fn dist(a: Xy, b: Xy) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Equirectangular scaling (meters per degree) around a reference latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarFrame {
    pub kx: f64,
    pub ky: f64,
}

impl PlanarFrame {
    pub fn at_latitude(lat_deg: f64) -> Self {
        Self {
            kx: M_PER_DEG_LNG_EQUATOR * lat_deg.to_radians().cos(),
            ky: M_PER_DEG_LAT,
        }
    }

    /// Frame for the segment `a`-`b`, scaled at its mean latitude.
    pub fn for_segment(a: Position, b: Position) -> Self {
        Self::at_latitude((a.lat + b.lat) / 2.0)
    }

    pub fn project(&self, p: Position) -> Xy {
        Xy::new(p.lng * self.kx, p.lat * self.ky)
    }

    pub fn unproject(&self, q: Xy) -> Position {
        Position::new(q.x / self.kx, q.y / self.ky)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ClosestPoint {
    /// Projection parameter along the segment, clamped to `[0, 1]`.
    pub t: f64,
    pub q: Xy,
    pub dist: f64,
}

pub fn closest_point_on_segment(p: Xy, a: Xy, b: Xy) -> ClosestPoint {
    let ab = sub(b, a);
    let ap = sub(p, a);
    let ab2 = norm2(ab);

    let t = if ab2 == 0.0 {
        0.0
    } else {
        (dot(ap, ab) / ab2).clamp(0.0, 1.0)
    };

    let q = add(a, mul(ab, t));
    ClosestPoint {
        t,
        q,
        dist: dist(p, q),
    }
}

/// Haversine polyline length between vertex indices `i0..=i1`.
///
/// Indices are clamped into the polyline; an inverted range yields 0.
pub fn length_between(points: &[Position], i0: usize, i1: usize) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let last = points.len() - 1;
    let start = i0.min(last);
    let end = i1.min(last).max(start);

    points[start..=end]
        .windows(2)
        .map(|w| haversine_m(w[0], w[1]))
        .sum()
}

pub fn polyline_length(points: &[Position]) -> f64 {
    length_between(points, 0, points.len().saturating_sub(1))
}

/// Average walking pace (2 mph) used when a route carries no duration.
pub const FALLBACK_WALKING_MPS: f64 = 1609.344 * 2.0 / 3600.0;

/// Two-point route drawn when the routing service cannot produce one.
pub fn straight_line_route(origin: Position, destination: Position) -> Route {
    let distance_m = haversine_m(origin, destination);
    Route {
        distance_m,
        duration_s: distance_m / FALLBACK_WALKING_MPS,
        polyline: vec![origin, destination],
        instructions: vec![
            Instruction {
                distance_m,
                duration_ms: 0.0,
                text: "Head toward the destination".to_string(),
                turn_sign: TurnSign::Continue,
                vertex_interval: (0, 1),
                street_name: None,
            },
            Instruction {
                distance_m: 0.0,
                duration_ms: 0.0,
                text: "Arrive at destination".to_string(),
                turn_sign: TurnSign::Arrive,
                vertex_interval: (1, 1),
                street_name: None,
            },
        ],
        waypoints: (origin, destination),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_one_degree_of_latitude() {
        let d = haversine_m(Position::new(0.0, 0.0), Position::new(0.0, 1.0));
        // 2πR/360
        assert!((d - 111_194.93).abs() < 1.0);
    }

    #[test]
    fn haversine_is_symmetric_and_zero_on_identity() {
        let a = Position::new(-97.743, 30.267);
        let b = Position::new(-97.740, 30.270);
        assert!((haversine_m(a, b) - haversine_m(b, a)).abs() < 1e-9);
        assert_eq!(haversine_m(a, a), 0.0);
    }

    #[test]
    fn closest_point_clamps_to_endpoints() {
        let a = Xy::new(0.0, 0.0);
        let b = Xy::new(10.0, 0.0);

        let before = closest_point_on_segment(Xy::new(-5.0, 3.0), a, b);
        assert_eq!(before.t, 0.0);
        assert!((before.dist - 34f64.sqrt()).abs() < 1e-12);

        let mid = closest_point_on_segment(Xy::new(4.0, -2.0), a, b);
        assert!((mid.t - 0.4).abs() < 1e-12);
        assert!((mid.dist - 2.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_segment_projects_onto_its_start() {
        let a = Xy::new(1.0, 1.0);
        let cp = closest_point_on_segment(Xy::new(4.0, 5.0), a, a);
        assert_eq!(cp.t, 0.0);
        assert!((cp.dist - 5.0).abs() < 1e-12);
    }

    #[test]
    fn length_between_clamps_indices() {
        let pts = [
            Position::new(0.0, 0.0),
            Position::new(0.0, 0.001),
            Position::new(0.0, 0.002),
        ];
        let full = polyline_length(&pts);
        assert!((length_between(&pts, 0, 99) - full).abs() < 1e-9);
        assert_eq!(length_between(&pts, 2, 1), 0.0);
        assert_eq!(length_between(&pts[..1], 0, 0), 0.0);
    }

    #[test]
    fn straight_line_route_uses_great_circle_distance() {
        let o = Position::new(-97.743, 30.267);
        let d = Position::new(-97.740, 30.270);
        let r = straight_line_route(o, d);
        assert_eq!(r.polyline.len(), 2);
        assert!((r.distance_m - haversine_m(o, d)).abs() < 1e-9);
        assert!(r.duration_s > 0.0);
        assert_eq!(r.instructions.last().map(|i| i.turn_sign), Some(TurnSign::Arrive));
    }
}

use crate::geo::{PlanarFrame, closest_point_on_segment, haversine_m};
use crate::model::{Position, Route, SnapResult};

/// Snap `position` onto the route polyline.
///
/// Every segment is projected in its own planar frame; the first segment
/// reaching the minimum distance wins. `traveled_m` is measured along the
/// polyline with great-circle segment lengths.
pub fn snap(route: &Route, position: Position) -> SnapResult {
    snap_to_polyline(&route.polyline, position)
}

pub fn snap_to_polyline(points: &[Position], position: Position) -> SnapResult {
    if points.len() < 2 {
        return match points.first() {
            Some(&only) => SnapResult {
                closest: only,
                off_distance_m: haversine_m(position, only),
                next_vertex_index: 0,
                traveled_m: 0.0,
            },
            None => SnapResult {
                closest: position,
                off_distance_m: 0.0,
                next_vertex_index: 0,
                traveled_m: 0.0,
            },
        };
    }

    let mut best: Option<SnapResult> = None;
    let mut cum = 0.0;

    for (i, seg) in points.windows(2).enumerate() {
        let (a, b) = (seg[0], seg[1]);
        let seg_len = haversine_m(a, b);

        let frame = PlanarFrame::for_segment(a, b);
        let cp = closest_point_on_segment(
            frame.project(position),
            frame.project(a),
            frame.project(b),
        );

        let better = best.is_none_or(|prev| cp.dist < prev.off_distance_m);
        if better {
            best = Some(SnapResult {
                closest: frame.unproject(cp.q),
                off_distance_m: cp.dist,
                next_vertex_index: i + 1,
                traveled_m: cum + seg_len * cp.t,
            });
        }

        cum += seg_len;
    }

    // At least one segment exists here.
    best.unwrap_or(SnapResult {
        closest: points[0],
        off_distance_m: haversine_m(position, points[0]),
        next_vertex_index: 1,
        traveled_m: 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn east_line() -> Vec<Position> {
        vec![
            Position::new(0.0, 0.0),
            Position::new(0.001, 0.0),
            Position::new(0.002, 0.0),
        ]
    }

    #[test]
    fn empty_polyline_returns_the_position_itself() {
        let p = Position::new(3.0, 4.0);
        let s = snap_to_polyline(&[], p);
        assert_eq!(s.closest, p);
        assert_eq!(s.off_distance_m, 0.0);
        assert_eq!(s.next_vertex_index, 0);
    }

    #[test]
    fn single_point_polyline_reports_point_distance() {
        let only = Position::new(0.0, 0.0);
        let p = Position::new(0.0, 0.001);
        let s = snap_to_polyline(&[only], p);
        assert_eq!(s.closest, only);
        assert!((s.off_distance_m - haversine_m(p, only)).abs() < 1e-9);
        assert_eq!(s.traveled_m, 0.0);
    }

    #[test]
    fn vertex_tie_prefers_the_earlier_segment() {
        let line = east_line();
        let s = snap_to_polyline(&line, line[1]);
        assert_eq!(s.next_vertex_index, 1);
        assert!(s.off_distance_m < 1e-9);
        assert!((s.traveled_m - haversine_m(line[0], line[1])).abs() < 1e-6);
    }

    #[test]
    fn position_before_start_clamps_to_first_vertex() {
        let line = east_line();
        let s = snap_to_polyline(&line, Position::new(-0.0005, 0.0));
        assert_eq!(s.next_vertex_index, 1);
        assert_eq!(s.traveled_m, 0.0);
        assert!((s.closest.lng - 0.0).abs() < 1e-12);
    }
}

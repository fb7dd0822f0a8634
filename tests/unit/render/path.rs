use kurbo::{PathEl, Shape};

use super::*;

fn round_rect(x: f64, y: f64, w: f64, h: f64, r: f64) -> PathBuilder {
    let r = clamp_corner_radius(w, h, r);
    let mut pb = PathBuilder::new();
    pb.move_to(Point::new(x + r, y));
    pb.arc_to(Point::new(x + w, y), Point::new(x + w, y + h), r).unwrap();
    pb.arc_to(Point::new(x + w, y + h), Point::new(x, y + h), r).unwrap();
    pb.arc_to(Point::new(x, y + h), Point::new(x, y), r).unwrap();
    pb.arc_to(Point::new(x, y), Point::new(x + w, y), r).unwrap();
    pb.close();
    pb
}

#[test]
fn clamp_corner_radius_per_axis() {
    assert_eq!(clamp_corner_radius(100.0, 100.0, 20.0), 20.0);
    assert_eq!(clamp_corner_radius(30.0, 100.0, 20.0), 15.0);
    assert_eq!(clamp_corner_radius(100.0, 10.0, 20.0), 5.0);
    // Width clamps first, then the height check sees the already-clamped value.
    assert_eq!(clamp_corner_radius(30.0, 20.0, 40.0), 10.0);
}

#[test]
fn arc_to_first_tangent_point_reflects_clamped_radius() {
    let pb = round_rect(0.0, 0.0, 40.0, 200.0, 100.0);
    let els = pb.path().elements();
    assert_eq!(els[0], PathEl::MoveTo(Point::new(20.0, 0.0)));
    match els[1] {
        PathEl::LineTo(p) => {
            assert!((p.x - 20.0).abs() < 1e-9);
            assert!(p.y.abs() < 1e-9);
        }
        other => panic!("expected LineTo, got {other:?}"),
    }
}

#[test]
fn rounded_rect_path_is_bounded_by_its_rect() {
    let pb = round_rect(10.0, 10.0, 100.0, 50.0, 40.0);
    let bb = pb.path().bounding_box();
    assert!((bb.x0 - 10.0).abs() < 1e-6);
    assert!((bb.y0 - 10.0).abs() < 1e-6);
    assert!((bb.x1 - 110.0).abs() < 1e-6);
    assert!((bb.y1 - 60.0).abs() < 1e-6);

    // The corner itself is cut away, the middle of each edge is not.
    let path = pb.path();
    assert!(path.winding(Point::new(11.0, 11.0)) == 0);
    assert!(path.winding(Point::new(60.0, 11.0)) != 0);
    assert!(path.winding(Point::new(60.0, 35.0)) != 0);
}

fn end_point(pb: &PathBuilder) -> Option<Point> {
    pb.path().elements().last().and_then(|el| el.end_point())
}

#[test]
fn arc_to_ends_on_second_tangent_point() {
    let mut pb = PathBuilder::new();
    pb.move_to(Point::new(0.0, 0.0));
    pb.arc_to(Point::new(10.0, 0.0), Point::new(10.0, 10.0), 4.0).unwrap();
    let cur = end_point(&pb).unwrap();
    assert!((cur.x - 10.0).abs() < 1e-9);
    assert!((cur.y - 4.0).abs() < 1e-9);
}

#[test]
fn arc_to_degenerate_cases_are_straight_lines() {
    let mut pb = PathBuilder::new();
    pb.move_to(Point::new(0.0, 0.0));
    pb.arc_to(Point::new(10.0, 0.0), Point::new(20.0, 0.0), 5.0).unwrap();
    assert_eq!(end_point(&pb), Some(Point::new(10.0, 0.0)));

    pb.arc_to(Point::new(10.0, 10.0), Point::new(0.0, 10.0), 0.0).unwrap();
    assert_eq!(end_point(&pb), Some(Point::new(10.0, 10.0)));

    assert!(pb.arc_to(Point::new(1.0, 1.0), Point::new(2.0, 2.0), -1.0).is_err());
}

#[test]
fn arc_to_without_subpath_starts_one() {
    let mut pb = PathBuilder::new();
    pb.arc_to(Point::new(5.0, 5.0), Point::new(9.0, 9.0), 2.0).unwrap();
    assert_eq!(pb.path().elements(), &[PathEl::MoveTo(Point::new(5.0, 5.0))]);

    pb.begin();
    assert!(pb.path().elements().is_empty());
    assert!(end_point(&pb).is_none());
}

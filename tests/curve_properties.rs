use approx::assert_relative_eq;
use mazecore::{BezierCurve, Curve, Float3, Spline, SplineConfig};

fn winding_points() -> Vec<Float3> {
    vec![
        Float3::new(0.0, 0.0, 0.0),
        Float3::new(1.0, 0.0, 0.0),
        Float3::new(2.0, 0.0, 1.0),
        Float3::new(3.0, 0.0, 1.0),
        Float3::new(4.0, 0.0, 0.0),
        Float3::new(5.0, 0.0, 2.0),
        Float3::new(6.0, 0.0, 2.0),
    ]
}

#[test]
fn colinear_bezier_keeps_its_direction() {
    let direction = Float3::new(1.0, 2.0, -0.5).normalize();
    let curve = BezierCurve::new(vec![
        Float3::ZERO,
        direction * 1.0,
        direction * 2.5,
        direction * 4.0,
    ])
    .unwrap();

    for i in 0..=10 {
        let tangent = curve.tangent(i as f32 / 10.0).normalize();
        assert_relative_eq!(tangent.dot(direction), 1.0, epsilon = 1e-4);
    }
}

#[test]
fn spline_joins_are_c1() {
    let spline = Spline::new(&winding_points(), SplineConfig::default()).unwrap();
    let segments = spline.segments();
    assert!(segments.len() >= 2);

    for pair in segments.windows(2) {
        assert!(pair[0].end_point().approx_eq(pair[1].start_point()));
        let out = pair[0].tangent(1.0).normalize();
        let into = pair[1].tangent(0.0).normalize();
        assert_relative_eq!(out.dot(into), 1.0, epsilon = 1e-4);
    }
}

#[test]
fn distance_and_parameter_round_trip() {
    let spline = Spline::new(&winding_points(), SplineConfig::default()).unwrap();
    for i in 1..10 {
        let t = i as f32 / 10.0;
        let distance = spline.distance_from_position(spline.point(t), false);
        let back = spline.t_at_distance(distance, false).unwrap();
        assert_relative_eq!(back, t, epsilon = 1e-2);

        let reverse = spline.distance_from_position(spline.point(t), true);
        assert_relative_eq!(distance + reverse, spline.total_distance(), epsilon = 1e-3);
    }
}

#[test]
fn rotation_minimizing_frames_reach_end_normal() {
    let mut spline = Spline::new(&winding_points(), SplineConfig::default()).unwrap();
    spline.set_rmf_start_normal(Float3::UP);

    // Without an end constraint a planar curve keeps its normal.
    assert_relative_eq!(spline.rmf_normal(1.0).dot(Float3::UP), 1.0, epsilon = 1e-3);

    let end_tangent = spline.tangent(1.0).normalize();
    let sideways = end_tangent.cross(Float3::UP).normalize();
    spline.set_rmf_end_normal(sideways);
    let normal = spline.rmf_normal(1.0);
    assert_relative_eq!(normal.dot(sideways).abs(), 1.0, epsilon = 1e-2);
    assert_relative_eq!(spline.rmf_normal(0.0).dot(Float3::UP), 1.0, epsilon = 1e-3);

    spline.set_rmf_end_normal(Float3::NAN);
    assert!(spline.rmf_end_normal().is_none());
}

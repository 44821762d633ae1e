use super::Curve;
use crate::error::{MazeError, Result};
use crate::geom::{binomial_coefficient, Float3, Quaternion};
use std::f32::consts::FRAC_PI_2;

/// Bezier curve of arbitrary degree, evaluated with Bernstein polynomials.
#[derive(Debug, Clone, PartialEq)]
pub struct BezierCurve {
    points: Vec<Float3>,
}

impl BezierCurve {
    /// Curve through the given control points (at least two).
    pub fn new(points: Vec<Float3>) -> Result<Self> {
        if points.len() < 2 {
            return Err(MazeError::TooFewControlPoints {
                needed: 2,
                got: points.len(),
            });
        }
        Ok(Self { points })
    }

    /// Like [`BezierCurve::new`], but pads the control points up to
    /// `min_points` without changing the curve's overall course.
    ///
    /// Two points become evenly spaced points on their line. Three points
    /// padded to four have their middle point replaced by two points half
    /// way towards its neighbours. Anything else gets evenly spaced points
    /// inserted between the last two.
    pub fn with_min_points(mut points: Vec<Float3>, min_points: usize) -> Result<Self> {
        if points.len() < 2 {
            return Err(MazeError::TooFewControlPoints {
                needed: 2,
                got: points.len(),
            });
        }
        if points.len() >= min_points {
            return Self::new(points);
        }

        match points.len() {
            2 => {
                let (first, last) = (points[0], points[1]);
                let intervals = (min_points - 1) as f32;
                points = (0..min_points)
                    .map(|i| first.lerp(last, i as f32 / intervals))
                    .collect();
            }
            3 if min_points == 4 => {
                let (a, center, c) = (points[0], points[1], points[2]);
                points = vec![
                    a,
                    center - (center - a) / 2.0,
                    center + (c - center) / 2.0,
                    c,
                ];
            }
            n => {
                let missing = min_points - n;
                let last = points[n - 1];
                let step = (last - points[n - 2]) / (missing + 1) as f32;
                let anchor = points[n - 2];
                points.truncate(n - 1);
                points.extend((1..=missing).map(|i| anchor + step * i as f32));
                points.push(last);
            }
        }
        Self::new(points)
    }

    pub fn control_points(&self) -> &[Float3] {
        &self.points
    }

    pub fn degree(&self) -> usize {
        self.points.len() - 1
    }

    pub fn start_point(&self) -> Float3 {
        self.points[0]
    }

    pub fn end_point(&self) -> Float3 {
        self.points[self.points.len() - 1]
    }

    /// Second derivative at `t`. Zero for curves below degree two.
    pub fn second_derivative(&self, t: f32) -> Float3 {
        let t = t.clamp(0.0, 1.0);
        let n = self.degree();
        if n < 2 {
            return Float3::ZERO;
        }
        let p = &self.points;
        (0..=n - 2).fold(Float3::ZERO, |acc, i| {
            let weight = bernstein(n - 2, i, t) * (n * (n - 1)) as f32;
            acc + (p[i + 2] - p[i + 1] * 2.0 + p[i]) * weight
        })
    }

    /// Frenet normal: the unit tangent turned 90 degrees towards the
    /// curvature. NaN where the curve is straight.
    pub fn normal(&self, t: f32) -> Float3 {
        let tangent = self.tangent(t).normalize();
        let curvature = self.second_derivative(t).normalize();
        let axis = tangent.cross(curvature).normalize();
        if axis.sqr_magnitude() < f32::EPSILON {
            return Float3::NAN;
        }
        Quaternion::from_axis_angle(axis, FRAC_PI_2)
            .mul_vec(tangent)
            .normalize()
    }

    pub(crate) fn points_mut(&mut self) -> &mut [Float3] {
        &mut self.points
    }
}

impl Curve for BezierCurve {
    fn point(&self, t: f32) -> Float3 {
        let t = t.clamp(0.0, 1.0);
        let n = self.degree();
        self.points
            .iter()
            .enumerate()
            .fold(Float3::ZERO, |acc, (i, &p)| acc + p * bernstein(n, i, t))
    }

    /// Analytic derivative from cubic upward; lower degrees are straight, so
    /// the unit direction between two nearby samples is returned instead.
    fn tangent(&self, t: f32) -> Float3 {
        let n = self.degree();
        if n <= 2 {
            return (self.point(0.2) - self.point(0.1)).normalize();
        }
        let t = t.clamp(0.0, 1.0);
        let p = &self.points;
        (0..n).fold(Float3::ZERO, |acc, i| {
            acc + (p[i + 1] - p[i]) * (bernstein(n - 1, i, t) * n as f32)
        })
    }
}

fn bernstein(n: usize, i: usize, t: f32) -> f32 {
    binomial_coefficient(n, i) as f32 * (1.0 - t).powi((n - i) as i32) * t.powi(i as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cubic() -> BezierCurve {
        BezierCurve::new(vec![
            Float3::new(0.0, 0.0, 0.0),
            Float3::new(0.0, 1.0, 0.0),
            Float3::new(1.0, 1.0, 0.0),
            Float3::new(1.0, 0.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_endpoints_interpolated() {
        let curve = cubic();
        assert_eq!(curve.point(0.0), Float3::ZERO);
        assert_relative_eq!(curve.point(1.0).x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(curve.point(1.0).y, 0.0, epsilon = 1e-6);
        // Symmetric control polygon peaks at 0.75 in the middle.
        assert_relative_eq!(curve.point(0.5).x, 0.5, epsilon = 1e-6);
        assert_relative_eq!(curve.point(0.5).y, 0.75, epsilon = 1e-6);
    }

    #[test]
    fn test_parameter_is_clamped() {
        let curve = cubic();
        assert_eq!(curve.point(-1.0), curve.point(0.0));
        assert_eq!(curve.point(3.0), curve.point(1.0));
    }

    #[test]
    fn test_tangent_at_ends_follows_control_legs() {
        let curve = cubic();
        let start = curve.tangent(0.0);
        assert_relative_eq!(start.y, 3.0, epsilon = 1e-6);
        assert_relative_eq!(start.x, 0.0, epsilon = 1e-6);
        let end = curve.tangent(1.0);
        assert_relative_eq!(end.y, -3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_colinear_tangent_keeps_direction() {
        let curve = BezierCurve::new(vec![
            Float3::new(0.0, 0.0, 0.0),
            Float3::new(0.0, 0.0, 1.0),
            Float3::new(0.0, 0.0, 2.5),
            Float3::new(0.0, 0.0, 3.0),
        ])
        .unwrap();
        for i in 0..=10 {
            let tangent = curve.tangent(i as f32 / 10.0).normalize();
            assert_relative_eq!(tangent.z, 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_low_degree_tangent_is_unit_direction() {
        let line = BezierCurve::new(vec![Float3::ZERO, Float3::new(4.0, 0.0, 0.0)]).unwrap();
        let tangent = line.tangent(0.7);
        assert_relative_eq!(tangent.x, 1.0, epsilon = 1e-6);
        assert_eq!(line.second_derivative(0.5), Float3::ZERO);
    }

    #[test]
    fn test_frenet_normal_points_into_bend() {
        let curve = cubic();
        let normal = curve.normal(0.5);
        assert_relative_eq!(normal.y, -1.0, epsilon = 1e-5);
        assert!(curve.normal(0.5).dot(curve.tangent(0.5)).abs() < 1e-5);

        let straight =
            BezierCurve::new(vec![Float3::ZERO, Float3::RIGHT, Float3::RIGHT * 2.0, Float3::RIGHT * 3.0])
                .unwrap();
        assert!(straight.normal(0.5).is_nan());
    }

    #[test]
    fn test_too_few_points() {
        assert!(matches!(
            BezierCurve::new(vec![Float3::ZERO]),
            Err(MazeError::TooFewControlPoints { needed: 2, got: 1 })
        ));
        assert!(BezierCurve::with_min_points(vec![Float3::ZERO], 4).is_err());
    }

    #[test]
    fn test_min_points_from_two() {
        let curve =
            BezierCurve::with_min_points(vec![Float3::ZERO, Float3::new(3.0, 0.0, 0.0)], 4).unwrap();
        let xs: Vec<f32> = curve.control_points().iter().map(|p| p.x).collect();
        assert_eq!(curve.control_points().len(), 4);
        for (x, expected) in xs.iter().zip([0.0, 1.0, 2.0, 3.0]) {
            assert_relative_eq!(*x, expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_min_points_from_three() {
        let curve = BezierCurve::with_min_points(
            vec![Float3::ZERO, Float3::new(2.0, 0.0, 0.0), Float3::new(2.0, 0.0, 2.0)],
            4,
        )
        .unwrap();
        let p = curve.control_points();
        assert_eq!(p.len(), 4);
        assert_eq!(p[1], Float3::new(1.0, 0.0, 0.0));
        assert_eq!(p[2], Float3::new(2.0, 0.0, 1.0));
        assert_eq!(p[3], Float3::new(2.0, 0.0, 2.0));
    }

    #[test]
    fn test_min_points_inserts_before_last() {
        let points = vec![
            Float3::ZERO,
            Float3::new(1.0, 0.0, 0.0),
            Float3::new(1.0, 0.0, 3.0),
        ];
        let curve = BezierCurve::with_min_points(points, 5).unwrap();
        let p = curve.control_points();
        assert_eq!(p.len(), 5);
        assert_relative_eq!(p[2].z, 1.0, epsilon = 1e-6);
        assert_relative_eq!(p[3].z, 2.0, epsilon = 1e-6);
        assert_eq!(p[4], Float3::new(1.0, 0.0, 3.0));
    }
}

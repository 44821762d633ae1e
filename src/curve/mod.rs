//! Curve engine: N-degree Bezier curves, C1-continuous splines built from
//! them, and rotation-minimizing frames along either.
//!
//! All curves are parameterized by `t` in `[0, 1]`; out-of-range values are
//! clamped.

mod bezier;
mod rmf;
mod spline;

pub use bezier::BezierCurve;
pub use rmf::RotationMinimizingFrames;
pub use spline::Spline;

use crate::geom::Float3;

/// A parametric curve that can be sampled for positions and tangents.
pub trait Curve {
    fn point(&self, t: f32) -> Float3;

    /// First derivative at `t`. Not necessarily unit length.
    fn tangent(&self, t: f32) -> Float3;
}

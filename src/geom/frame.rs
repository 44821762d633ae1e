use super::math::{Float3, Quaternion};

/// Orthonormal frame attached to a point on a curve.
///
/// - `tangent`: direction of travel
/// - `normal`: "up" for anything riding the curve
/// - `binormal`: `tangent x normal`
///
/// C-compatible layout for FFI.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    pub tangent: Float3,
    pub normal: Float3,
    pub binormal: Float3,
}

impl Frame {
    pub const fn new(tangent: Float3, normal: Float3, binormal: Float3) -> Self {
        Self {
            tangent,
            normal,
            binormal,
        }
    }

    /// Builds a frame from a tangent and an approximate normal.
    ///
    /// The normal is projected onto the plane perpendicular to the tangent.
    /// If the two are parallel the normal is nudged first so that a valid
    /// frame always comes out.
    pub fn from_tangent_normal(tangent: Float3, normal: Float3) -> Self {
        let t = tangent.normalize();
        let n = legalise_normal(t, normal);
        Self::new(t, n, t.cross(n).normalize())
    }

    /// Re-orthonormalizes the frame using the Gram-Schmidt process.
    ///
    /// Preserves the tangent exactly, orthogonalizes the normal against it,
    /// then recomputes the binormal.
    pub fn reorthonormalize(self) -> Self {
        let t = self.tangent.normalize();
        let n = (self.normal - t * t.dot(self.normal)).normalize();
        let b = t.cross(n).normalize();
        Self::new(t, n, b)
    }

    /// Rotates the frame around an arbitrary axis by the given angle in radians.
    pub fn rotate_around(self, axis: Float3, angle: f32) -> Self {
        let q = Quaternion::from_axis_angle(axis, angle);
        Self {
            tangent: q.mul_vec(self.tangent).normalize(),
            normal: q.mul_vec(self.normal).normalize(),
            binormal: q.mul_vec(self.binormal).normalize(),
        }
    }

    pub const DEFAULT: Self =
        Self::new(Float3::FORWARD, Float3::UP, Float3::new(-1.0, 0.0, 0.0));
}

impl Default for Frame {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Makes `normal` perpendicular to `tangent`.
///
/// A normal parallel to the tangent is nudged along the world axis least
/// aligned with the tangent before projection.
pub fn legalise_normal(tangent: Float3, normal: Float3) -> Float3 {
    let t = tangent.normalize();
    let mut n = normal.normalize();
    if t.cross(n).magnitude() < 1e-4 {
        let a = t.abs();
        let nudge = if a.x <= a.y && a.x <= a.z {
            Float3::RIGHT
        } else if a.y <= a.z {
            Float3::UP
        } else {
            Float3::FORWARD
        };
        n = n - nudge * 0.1;
    }
    t.cross(n.cross(t)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    fn assert_orthonormal(frame: Frame) {
        assert_relative_eq!(frame.tangent.magnitude(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(frame.normal.magnitude(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(frame.binormal.magnitude(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(frame.tangent.dot(frame.normal), 0.0, epsilon = 1e-5);
        assert_relative_eq!(frame.tangent.dot(frame.binormal), 0.0, epsilon = 1e-5);
        assert_relative_eq!(frame.normal.dot(frame.binormal), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_frame_default_orthonormal() {
        assert_orthonormal(Frame::DEFAULT);
        let b = Frame::DEFAULT.tangent.cross(Frame::DEFAULT.normal);
        assert_relative_eq!(b.x, Frame::DEFAULT.binormal.x, epsilon = 1e-6);
    }

    #[test]
    fn test_frame_rotate_around() {
        let rotated = Frame::DEFAULT.rotate_around(Float3::UP, PI / 2.0);

        assert_relative_eq!(rotated.tangent.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(rotated.tangent.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(rotated.tangent.z, 0.0, epsilon = 1e-6);
        assert_orthonormal(rotated);
    }

    #[test]
    fn test_reorthonormalize_corrects_drift() {
        let drifted = Frame::new(
            Float3::new(0.0, 0.0, 1.0001).normalize(),
            Float3::new(0.0001, 1.0, 0.0).normalize(),
            Float3::new(-1.0, 0.0001, 0.0).normalize(),
        );
        assert_orthonormal(drifted.reorthonormalize());
    }

    #[test]
    fn test_legalise_parallel_normal() {
        let n = legalise_normal(Float3::UP, Float3::UP);
        assert_relative_eq!(n.dot(Float3::UP), 0.0, epsilon = 1e-5);
        assert_relative_eq!(n.magnitude(), 1.0, epsilon = 1e-5);

        let n = legalise_normal(Float3::FORWARD, Float3::BACK);
        assert_relative_eq!(n.dot(Float3::FORWARD), 0.0, epsilon = 1e-5);
        assert_relative_eq!(n.magnitude(), 1.0, epsilon = 1e-5);

        let diag = Float3::ONE.normalize();
        let n = legalise_normal(diag, diag);
        assert_relative_eq!(n.dot(diag), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_from_tangent_normal_projects() {
        let frame = Frame::from_tangent_normal(Float3::FORWARD, Float3::new(0.0, 1.0, 1.0));
        assert_orthonormal(frame);
        assert_relative_eq!(frame.normal.y, 1.0, epsilon = 1e-5);
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// 3D vector with f32 components.
/// C-compatible layout for FFI.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Float3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Float3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }

    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);
    pub const DOWN: Self = Self::new(0.0, -1.0, 0.0);
    pub const RIGHT: Self = Self::new(1.0, 0.0, 0.0);
    pub const FORWARD: Self = Self::new(0.0, 0.0, 1.0);
    pub const BACK: Self = Self::new(0.0, 0.0, -1.0);
    /// Sentinel for "no usable result".
    pub const NAN: Self = Self::new(f32::NAN, f32::NAN, f32::NAN);

    pub fn magnitude(self) -> f32 {
        self.sqr_magnitude().sqrt()
    }

    pub fn sqr_magnitude(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    pub fn normalize(self) -> Self {
        let mag = self.magnitude();
        if mag < f32::EPSILON {
            return Self::ZERO;
        }
        self * (1.0 / mag)
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn distance(self, other: Self) -> f32 {
        (self - other).magnitude()
    }

    /// Component-wise product.
    pub fn scale(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }

    pub fn component_min(self) -> f32 {
        self.x.min(self.y).min(self.z)
    }

    pub fn component_max(self) -> f32 {
        self.x.max(self.y).max(self.z)
    }

    pub fn component_sum(self) -> f32 {
        self.x + self.y + self.z
    }

    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    pub fn is_nan(self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }

    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
        )
    }

    /// Per-component approximate equality with a tolerance relative to the
    /// larger magnitude, floored at a small absolute value.
    pub fn approx_eq(self, other: Self) -> bool {
        approximately(self.x, other.x)
            && approximately(self.y, other.y)
            && approximately(self.z, other.z)
    }

    /// Signed angle in radians from `self` to `other`, measured around `axis`.
    pub fn signed_angle(self, other: Self, axis: Self) -> f32 {
        let from = self.normalize();
        let to = other.normalize();
        let angle = from.dot(to).clamp(-1.0, 1.0).acos();
        if axis.dot(from.cross(to)) < 0.0 {
            -angle
        } else {
            angle
        }
    }
}

impl Add for Float3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl AddAssign for Float3 {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Float3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl SubAssign for Float3 {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Mul<f32> for Float3 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl Div<f32> for Float3 {
    type Output = Self;
    fn div(self, scalar: f32) -> Self {
        Self::new(self.x / scalar, self.y / scalar, self.z / scalar)
    }
}

impl Neg for Float3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Default for Float3 {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Formats as `(x, y, z)`; the precision flag sets the decimals (default 2).
impl fmt::Display for Float3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = f.precision().unwrap_or(2);
        write!(f, "({:.*}, {:.*}, {:.*})", p, self.x, p, self.y, p, self.z)
    }
}

/// Unit quaternion for 3D rotations.
/// C-compatible layout for FFI.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quaternion {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub fn from_axis_angle(axis: Float3, angle: f32) -> Self {
        let half_angle = angle * 0.5;
        let s = half_angle.sin();
        let c = half_angle.cos();
        let normalized = axis.normalize();

        Self::new(normalized.x * s, normalized.y * s, normalized.z * s, c)
    }

    pub fn mul_vec(self, v: Float3) -> Float3 {
        let qv = Float3::new(self.x, self.y, self.z);
        let uv = qv.cross(v);
        let uuv = qv.cross(uv);
        v + (uv * (2.0 * self.w)) + (uuv * 2.0)
    }
}

impl Mul for Quaternion {
    type Output = Self;
    fn mul(self, other: Self) -> Self {
        Self::new(
            self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
            self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
        )
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Approximate scalar equality, relative to the larger magnitude and
/// floored at a small absolute tolerance.
pub fn approximately(a: f32, b: f32) -> bool {
    let tol = (1e-6 * a.abs().max(b.abs())).max(f32::EPSILON * 8.0);
    (a - b).abs() < tol
}

/// Closest point to `p` on the segment `a..b`, clamped to the segment.
pub fn closest_point_on_segment(p: Float3, a: Float3, b: Float3) -> Float3 {
    let ab = b - a;
    let len_sq = ab.sqr_magnitude();
    if len_sq < f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Number of ways to choose `k` items from `n`.
///
/// Zero when `k > n` or `n == 0`.
pub fn binomial_coefficient(n: usize, k: usize) -> usize {
    if k > n || n == 0 {
        return 0;
    }
    if n == 1 {
        return 1;
    }
    let k = k.min(n - k);
    (1..=k).fold(1, |acc, i| acc * (n + 1 - i) / i)
}

use super::Curve;
use crate::geom::{legalise_normal, Float3, Frame};

/// Rotation-minimizing frames sampled at `samples` evenly spaced parameter
/// values, built with the double reflection method of Wang et al. (2008).
///
/// The first frame's normal is the requested start normal made
/// perpendicular to the tangent. With an end normal set, the frames are
/// twisted progressively about their tangents so the last one lands on it
/// (or on its opposite, whichever needs less twist).
#[derive(Debug, Clone, PartialEq)]
pub struct RotationMinimizingFrames {
    frames: Vec<Frame>,
}

impl RotationMinimizingFrames {
    pub fn compute<C: Curve + ?Sized>(
        curve: &C,
        samples: usize,
        start_normal: Float3,
        end_normal: Option<Float3>,
    ) -> Self {
        let samples = samples.max(2);
        let step = 1.0 / (samples - 1) as f32;

        let mut tangent = curve.tangent(0.0).normalize();
        let mut normal = legalise_normal(tangent, start_normal);
        let mut frames = Vec::with_capacity(samples);
        frames.push(Frame::new(tangent, normal, tangent.cross(normal)));

        for i in 0..samples - 1 {
            let t = step * i as f32;
            let next_t = step * (i + 1) as f32;
            let next_tangent = curve.tangent(next_t).normalize();

            // Reflect across the bisector plane of the two sample points,
            // then across the plane that maps the reflected tangent onto the
            // next one. Coincident samples skip the first reflection.
            let v1 = curve.point(next_t) - curve.point(t);
            let c1 = v1.dot(v1);
            let (reflected_normal, reflected_tangent) = if c1 > f32::EPSILON {
                (
                    normal - v1 * (2.0 / c1 * v1.dot(normal)),
                    tangent - v1 * (2.0 / c1 * v1.dot(tangent)),
                )
            } else {
                (normal, tangent)
            };
            let v2 = next_tangent - reflected_tangent;
            let c2 = v2.dot(v2);
            let next_normal = if c2 > f32::EPSILON {
                reflected_normal - v2 * (2.0 / c2 * v2.dot(reflected_normal))
            } else {
                reflected_normal
            };

            frames.push(Frame::new(
                next_tangent,
                next_normal,
                next_tangent.cross(next_normal),
            ));
            tangent = next_tangent;
            normal = next_normal;
        }

        let mut rmf = Self { frames };
        if let Some(end) = end_normal.filter(|n| !n.is_nan()) {
            rmf.twist_towards(legalise_normal(curve.tangent(1.0), end));
        }
        rmf
    }

    fn twist_towards(&mut self, end: Float3) {
        let last = self.frames[self.frames.len() - 1];
        let mut angle = last.normal.signed_angle(end, last.tangent);
        let flipped = last.normal.signed_angle(-end, last.tangent);
        if flipped.abs() < angle.abs() {
            angle = flipped;
        }

        let intervals = (self.frames.len() - 1) as f32;
        for (i, frame) in self.frames.iter_mut().enumerate() {
            let amount = angle * i as f32 / intervals;
            *frame = frame.rotate_around(frame.tangent, amount);
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Parameter value of frame `index`.
    pub fn sample_t(&self, index: usize) -> f32 {
        index as f32 / (self.frames.len() - 1) as f32
    }

    /// Normal at `t`, blended from the two bracketing frames and normalized.
    pub fn normal_at(&self, t: f32) -> Float3 {
        let t = t.clamp(0.0, 1.0);
        let last = self.frames.len() - 1;
        let lower = ((t * last as f32).floor() as usize).min(last);
        let (i0, i1) = if lower == last {
            (last - 1, last)
        } else {
            (lower, lower + 1)
        };

        let (t0, t1) = (self.sample_t(i0), self.sample_t(i1));
        let range = t1 - t0;
        let w0 = range - (t - t0);
        let w1 = range - (t1 - t);
        let blended = (self.frames[i0].normal * w0 + self.frames[i1].normal * w1) / (w0 + w1);
        blended.normalize()
    }
}

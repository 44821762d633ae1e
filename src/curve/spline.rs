use super::{BezierCurve, Curve, RotationMinimizingFrames};
use crate::config::SplineConfig;
use crate::error::{MazeError, Result};
use crate::geom::{approximately, closest_point_on_segment, Float3};
use log::trace;
use std::sync::OnceLock;

/// Chain of Bezier segments joined with matching tangent directions.
///
/// The spline parameter `t` advances by the same amount between every pair
/// of consecutive unique control points, regardless of which segment they
/// belong to. Arc length is approximated from an evenly sampled table that,
/// like the rotation-minimizing frames, is built on first use and dropped
/// whenever the spline changes.
#[derive(Debug, Clone)]
pub struct Spline {
    segments: Vec<BezierCurve>,
    config: SplineConfig,
    start_normal: Float3,
    end_normal: Option<Float3>,
    table: OnceLock<SampleTable>,
    frames: OnceLock<RotationMinimizingFrames>,
}

#[derive(Debug, Clone)]
struct SampleTable {
    distances: Vec<f32>,
    positions: Vec<Float3>,
}

impl SampleTable {
    fn total(&self) -> f32 {
        self.distances[self.distances.len() - 1]
    }
}

impl Spline {
    /// Fits a spline through `points`, splitting them into segments of at
    /// most `config.max_degree` control points.
    pub fn new(points: &[Float3], config: SplineConfig) -> Result<Self> {
        let mut spline = Self {
            segments: Vec::new(),
            config,
            start_normal: Float3::UP,
            end_normal: None,
            table: OnceLock::new(),
            frames: OnceLock::new(),
        };
        spline.add_segment(points)?;
        Ok(spline)
    }

    /// Appends control points that continue from the current end point.
    ///
    /// The control point before each join and the one after it are moved
    /// onto the averaged tangent direction, so the spline stays C1.
    pub fn add_segment(&mut self, points: &[Float3]) -> Result<()> {
        if points.len() < 2 {
            return Err(MazeError::TooFewControlPoints {
                needed: 2,
                got: points.len(),
            });
        }
        let max = self.config.max_degree.max(2);
        let min = self.config.min_degree.max(2);

        let mut rest = points;
        while rest.len() >= max + min - 1 {
            self.push_segment(&rest[..max])?;
            rest = &rest[max - 1..];
        }
        self.push_segment(rest)?;

        self.table = OnceLock::new();
        self.frames = OnceLock::new();
        Ok(())
    }

    fn push_segment(&mut self, points: &[Float3]) -> Result<()> {
        let mut curve = BezierCurve::with_min_points(points.to_vec(), self.config.min_degree)?;
        if let Some(previous) = self.segments.last_mut() {
            join_smoothly(previous, &mut curve, self.config.continuity_factor);
        }
        self.segments.push(curve);
        Ok(())
    }

    pub fn segments(&self) -> &[BezierCurve] {
        &self.segments
    }

    pub fn config(&self) -> &SplineConfig {
        &self.config
    }

    pub fn start_point(&self) -> Float3 {
        self.segments[0].start_point()
    }

    pub fn end_point(&self) -> Float3 {
        self.segments[self.segments.len() - 1].end_point()
    }

    pub fn control_point_count(&self) -> usize {
        self.segments.iter().map(|s| s.control_points().len()).sum()
    }

    /// Control points with each shared join point counted once.
    pub fn unique_control_point_count(&self) -> usize {
        self.control_point_count() - (self.segments.len() - 1)
    }

    pub fn sample_count(&self) -> usize {
        (self.unique_control_point_count() * self.config.samples_per_control_point.max(1)).max(2)
    }

    /// Spline parameter of table sample `index`.
    pub fn sample_t(&self, index: usize) -> f32 {
        index as f32 / (self.sample_count() - 1) as f32
    }

    /// Maps spline `t` to a segment index and that segment's own `t`.
    pub fn section(&self, t: f32) -> (usize, f32) {
        let t = t.clamp(0.0, 1.0);
        let intervals = (self.unique_control_point_count() - 1) as f32;
        let width = 1.0 / intervals;

        let (section, global, local) = if approximately(t, 0.0) {
            (0, 0, 0)
        } else if approximately(t, 1.0) {
            let last = self.segments.len() - 1;
            (
                last,
                self.unique_control_point_count() - 1,
                self.segments[last].degree(),
            )
        } else {
            let global = ((t / width).floor() as usize).min(self.unique_control_point_count() - 2);
            let mut first = 0;
            let mut section = self.segments.len() - 1;
            for (i, segment) in self.segments.iter().enumerate() {
                if global < first + segment.degree() {
                    section = i;
                    break;
                }
                first += segment.degree();
            }
            (section, global, global - first)
        };

        let within_interval = (t - global as f32 * width) * intervals;
        let segment_intervals = self.segments[section].degree() as f32;
        let local_t = (within_interval + local as f32) / segment_intervals;
        (section, local_t.clamp(0.0, 1.0))
    }

    /// Inverse of [`Spline::section`].
    pub fn spline_t(&self, section: usize, local_t: f32) -> f32 {
        let local_t = local_t.clamp(0.0, 1.0);
        let intervals = (self.unique_control_point_count() - 1) as f32;
        let offset: usize = self.segments[..section].iter().map(|s| s.degree()).sum();
        let segment_intervals = self.segments[section].degree() as f32;
        (offset as f32 + local_t * segment_intervals) / intervals
    }

    /// Frenet normal of the underlying segment at `t`.
    pub fn normal(&self, t: f32) -> Float3 {
        let (section, local) = self.section(t);
        self.segments[section].normal(local)
    }

    /// Unit vector from the point at `t` towards `reference`.
    pub fn normal_towards(&self, t: f32, reference: Float3) -> Float3 {
        (reference - self.point(t)).normalize()
    }

    // --- Rotation-minimizing frames ---

    pub fn set_rmf_start_normal(&mut self, normal: Float3) {
        self.start_normal = normal.normalize();
        self.frames = OnceLock::new();
    }

    /// Twists the frames so the last normal matches `normal`; NaN clears it.
    pub fn set_rmf_end_normal(&mut self, normal: Float3) {
        self.end_normal = (!normal.is_nan()).then(|| normal.normalize());
        self.frames = OnceLock::new();
    }

    pub fn rmf_start_normal(&self) -> Float3 {
        self.start_normal
    }

    pub fn rmf_end_normal(&self) -> Option<Float3> {
        self.end_normal
    }

    pub fn frames(&self) -> &RotationMinimizingFrames {
        self.frames.get_or_init(|| {
            RotationMinimizingFrames::compute(
                self,
                self.sample_count(),
                self.start_normal,
                self.end_normal,
            )
        })
    }

    pub fn rmf_normal(&self, t: f32) -> Float3 {
        self.frames().normal_at(t)
    }

    // --- Arc length ---

    fn table(&self) -> &SampleTable {
        self.table.get_or_init(|| {
            let count = self.sample_count();
            trace!("building spline sample table with {count} samples");
            let mut distances = Vec::with_capacity(count);
            let mut positions = Vec::with_capacity(count);
            let mut previous = self.point(0.0);
            distances.push(0.0);
            positions.push(previous);
            for i in 1..count {
                let current = self.point(self.sample_t(i));
                distances.push(distances[i - 1] + current.distance(previous));
                positions.push(current);
                previous = current;
            }
            SampleTable {
                distances,
                positions,
            }
        })
    }

    pub fn total_distance(&self) -> f32 {
        self.table().total()
    }

    /// Arc length from the start (or from the end with `reverse`) to the
    /// point on the spline nearest `position`.
    pub fn distance_from_position(&self, position: Float3, reverse: bool) -> f32 {
        let table = self.table();
        let positions = &table.positions;
        let last = positions.len() - 1;

        let mut nearest = 0;
        for (i, p) in positions.iter().enumerate() {
            if position.distance(*p) < position.distance(positions[nearest]) {
                nearest = i;
            }
        }
        let other = if nearest == 0 {
            1
        } else if nearest == last {
            last - 1
        } else if position.distance(positions[nearest - 1]) < position.distance(positions[nearest + 1]) {
            nearest - 1
        } else {
            nearest + 1
        };
        let (i0, i1) = (nearest.min(other), nearest.max(other));

        let closest = closest_point_on_segment(position, positions[i0], positions[i1]);
        let span = positions[i0].distance(positions[i1]);
        let fraction = if span > f32::EPSILON {
            positions[i0].distance(closest) / span
        } else {
            0.0
        };
        let distance = lerp(table.distances[i0], table.distances[i1], fraction);
        if reverse {
            table.total() - distance
        } else {
            distance
        }
    }

    /// Spline parameter at arc length `distance` from the start (or from the
    /// end with `reverse`).
    pub fn t_at_distance(&self, distance: f32, reverse: bool) -> Result<f32> {
        let table = self.table();
        let total = table.total();
        let d = if reverse { total - distance } else { distance };
        if !(0.0..=total).contains(&d) {
            return Err(MazeError::DistanceOutOfRange { distance, total });
        }

        let distances = &table.distances;
        let last = distances.len() - 1;
        let lower = distances.partition_point(|&x| x < d).saturating_sub(1);
        let (i0, i1) = if lower == last {
            (last - 1, last)
        } else {
            (lower, lower + 1)
        };

        let span = distances[i1] - distances[i0];
        let fraction = if span > 0.0 {
            (d - distances[i0]) / span
        } else {
            0.0
        };
        Ok(lerp(self.sample_t(i0), self.sample_t(i1), fraction))
    }
}

impl Curve for Spline {
    fn point(&self, t: f32) -> Float3 {
        let (section, local) = self.section(t);
        self.segments[section].point(local)
    }

    fn tangent(&self, t: f32) -> Float3 {
        let (section, local) = self.section(t);
        self.segments[section].tangent(local)
    }
}

/// Moves the control point before the join and the one after it onto the
/// averaged tangent direction.
///
/// Handle length comes from the shorter of the two adjacent legs, each
/// weighted by its segment's point count and divided twice by the mean
/// point count (integer mean), then scaled by `factor`.
fn join_smoothly(previous: &mut BezierCurve, next: &mut BezierCurve, factor: f32) {
    let direction = ((previous.tangent(1.0).normalize() + next.tangent(0.0).normalize()) / 2.0).normalize();
    let n = previous.control_points().len();
    let m = next.control_points().len();

    let pre = previous.control_points();
    let post = next.control_points();
    let pre_leg = pre[n - 1].distance(pre[n - 2]);
    let post_leg = post[0].distance(post[1]);
    let mean = ((n + m) / 2) as f32;
    let handle = (pre_leg * n as f32).min(post_leg * m as f32) / mean / mean * factor;

    let join_in = pre[n - 1];
    let join_out = post[0];
    previous.points_mut()[n - 2] = join_in - direction * (handle * n as f32);
    next.points_mut()[1] = join_out + direction * (handle * m as f32);
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

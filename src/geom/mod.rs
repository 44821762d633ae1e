//! Geometry primitives shared by the maze graph and the curve engine.

mod frame;
mod math;

pub use frame::{legalise_normal, Frame};
pub use math::{approximately, binomial_coefficient, closest_point_on_segment, Float3, Quaternion};

pub mod consts;
pub mod error;

pub mod tuple;
pub mod color;
pub mod ray;

pub mod shape;
pub mod intersect;
pub mod light;

pub mod world;
pub mod camera;
pub mod scene;

pub mod canvas;
pub mod parser;
pub mod parallel;

use crate::consts::FEQ_EPSILON;

/// Compares two floats within `FEQ_EPSILON`.
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}

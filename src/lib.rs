pub mod consts;
pub mod error;

pub mod vector;
pub mod matrix;
pub mod transform;
pub mod ray;

pub mod color;
pub mod light;
pub mod shape;
pub mod intersect;

pub mod camera;
pub mod scene;
pub mod sampler;
pub mod render;
pub mod parallel;

pub mod canvas;
pub mod loader;

pub use error::{ Error, Result };

use consts::FEQ_EPSILON;

/// Approximate floating point equality.
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}

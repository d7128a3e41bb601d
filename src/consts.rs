// Floating point comparisons
pub const FEQ_EPSILON: f64 = 0.0001;

// Offset applied to shadow and reflection ray origins to avoid "acne"
pub const RAY_EPSILON: f64 = 0.001;

// Rays closer than this to parallel with a triangle's plane are rejected
pub const PARALLEL_EPSILON: f64 = 1e-9;

// Tolerance on barycentric bounds for edge-adjacent triangle hits
pub const BARYCENTRIC_EPSILON: f64 = 1e-6;

// Maximum recursion depth for reflected rays
pub const DEFAULT_MAX_DEPTH: usize = 5;

// Upper bound on reflection bounces; each bounce is a stack frame
pub const MAX_RECURSION_DEPTH: usize = 64;

// Maximum number of saved transforms on an `AffineTransform` stack
pub const MAX_TRANSFORM_DEPTH: usize = 64;

// Runtime defaults
pub const OUT_FILE: &str = "./out.ppm";

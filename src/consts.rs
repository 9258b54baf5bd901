// Floating point comparisons
pub const FEQ_EPSILON: f64 = 1e-9;

// Intersection thresholds. Determinants and denominators below
// `DET_EPSILON` are treated as parallel; hits must satisfy `t > T_EPSILON`.
pub const DET_EPSILON: f64 = 1e-8;
pub const T_EPSILON: f64 = 1e-6;

// Offset along the surface normal for shadow and reflection ray origins.
pub const SHADOW_EPSILON: f64 = 1e-4;

// Scene defaults
pub const DEFAULT_MAX_DEPTH: usize = 5;
pub const DEFAULT_SHININESS: f64 = 10.0;
pub const DEFAULT_OUTPUT: &str = "output.png";

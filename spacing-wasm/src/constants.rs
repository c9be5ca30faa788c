/// Input-widget ranges. Lengths are inches, angles degrees.
pub const HEIGHT_MIN_IN: f64 = 0.0;
pub const HEIGHT_MAX_IN: f64 = 240.0;
pub const HEIGHT_STEP_IN: f64 = 1.0;
/// Beam-angle slider step (the range itself comes from spacing-core).
pub const ANGLE_STEP_DEG: f64 = 1.0;
/// Spacing-factor step for both the slider and the number box.
pub const FACTOR_STEP: f64 = 0.01;

use serde::{Deserialize, Serialize};

/// Spacing factor bounds applied when a value is typed in by hand.
pub const SPACING_FACTOR_MIN: f64 = 0.60;
pub const SPACING_FACTOR_MAX: f64 = 1.20;
/// Beam-angle widget range (degrees). Programmatic values are not clamped.
pub const BEAM_ANGLE_MIN: f64 = 1.0;
pub const BEAM_ANGLE_MAX: f64 = 170.0;

/// How the beam-angle input is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleMode {
    /// The input is the total included cone angle; trig uses half of it.
    #[default]
    Full,
    /// The input is already the half-angle.
    Half,
}

/// The current input tuple. Lengths in inches, angle in degrees.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SpacingInputs {
    pub ceiling_height: f64,
    pub work_plane_height: f64,
    pub beam_angle: f64,
    #[serde(default)]
    pub angle_mode: AngleMode,
    pub spacing_factor: f64,
}

impl Default for SpacingInputs {
    fn default() -> Self {
        SpacingInputs {
            ceiling_height: 108.0,
            work_plane_height: 36.0,
            beam_angle: 30.0,
            angle_mode: AngleMode::Full,
            spacing_factor: 1.0,
        }
    }
}

/// Everything derived from one input tuple. Recomputed in full on every
/// change; no field is independently mutable.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct SpacingResult {
    /// Ceiling minus work plane, floored at 0 (inches).
    pub mounting_height: f64,
    /// The angle actually used in the tangent formula (degrees).
    pub half_angle_deg: f64,
    /// Beam footprint radius at the work plane (inches).
    pub radius: f64,
    /// Spacing at which adjacent beam edges just meet (inches).
    pub touch_spacing: f64,
    /// Touch spacing scaled by the spacing factor (inches).
    pub chosen_spacing: f64,
    /// max(0, touch - chosen) (inches).
    pub overlap: f64,
    /// overlap / touch * 100, or 0 when touch is 0.
    pub overlap_percent: f64,
}

/// Derive the full spacing record from one input tuple.
///
/// Pure and total: out-of-domain inputs produce mathematically consistent
/// but possibly non-physical values (negative, infinite, zero) rather than
/// errors. The only clamp is the mounting-height floor at 0, so a work
/// plane above the ceiling yields zero spacing instead of a flipped
/// geometry. A 90-degree half-angle makes the radius non-finite; display
/// code substitutes a sentinel for such values.
pub fn compute_spacing(inputs: &SpacingInputs) -> SpacingResult {
    let mounting_height = (inputs.ceiling_height - inputs.work_plane_height).max(0.0);
    let half_angle_deg = match inputs.angle_mode {
        AngleMode::Full => inputs.beam_angle / 2.0,
        AngleMode::Half => inputs.beam_angle,
    };
    let radius = mounting_height * half_angle_deg.to_radians().tan();
    let touch_spacing = 2.0 * radius;
    let chosen_spacing = inputs.spacing_factor * touch_spacing;
    let overlap = (touch_spacing - chosen_spacing).max(0.0);
    let overlap_percent = if touch_spacing > 0.0 {
        overlap / touch_spacing * 100.0
    } else {
        0.0
    };
    SpacingResult {
        mounting_height,
        half_angle_deg,
        radius,
        touch_spacing,
        chosen_spacing,
        overlap,
        overlap_percent,
    }
}

/// Clamp a hand-entered spacing factor to the supported range.
pub fn clamp_spacing_factor(v: f64) -> f64 {
    v.clamp(SPACING_FACTOR_MIN, SPACING_FACTOR_MAX)
}

/// Placeholder shown instead of a number when a length is not finite.
pub const NON_FINITE_PLACEHOLDER: &str = "\u{2013}";

/// Format a length in inches as feet and inches rounded to the nearest
/// eighth of an inch, e.g. `3'-2 5/8"`.
///
/// The fraction is kept in eighths and never reduced (`4/8` stays `4/8`).
/// Rounding carries explicitly: 8/8 rolls into the whole inch, 12 inches
/// roll into feet. Negative input renders with a leading sign; non-finite
/// input renders as a placeholder.
pub fn format_feet_inches(inches: f64) -> String {
    if !inches.is_finite() {
        return NON_FINITE_PLACEHOLDER.to_string();
    }
    let neg = inches < 0.0;
    // Work in whole eighths of the absolute value; integer division then
    // handles both carries at once.
    let total_eighths = (inches.abs() * 8.0).round() as u64;
    let feet = total_eighths / 96;
    let rem = total_eighths % 96;
    let whole = rem / 8;
    let num = rem % 8;
    let body = if num == 0 {
        format!("{}'-{}\"", feet, whole)
    } else {
        format!("{}'-{} {}/8\"", feet, whole, num)
    };
    if neg { format!("-{}", body) } else { body }
}

/// A canonical input tuple selectable from the UI.
#[derive(Clone, Copy, Debug)]
pub struct Preset {
    pub id: &'static str,
    pub label: &'static str,
    pub inputs: SpacingInputs,
}

/// Presets shared by the browser UI and the CLI renderer.
pub const PRESETS: [Preset; 4] = [
    Preset {
        id: "office",
        label: "Office downlight",
        inputs: SpacingInputs {
            ceiling_height: 108.0,
            work_plane_height: 36.0,
            beam_angle: 30.0,
            angle_mode: AngleMode::Full,
            spacing_factor: 1.0,
        },
    },
    Preset {
        id: "counter",
        label: "Task counter",
        inputs: SpacingInputs {
            ceiling_height: 96.0,
            work_plane_height: 36.0,
            beam_angle: 60.0,
            angle_mode: AngleMode::Full,
            spacing_factor: 0.9,
        },
    },
    Preset {
        id: "gallery",
        label: "Gallery wash",
        inputs: SpacingInputs {
            ceiling_height: 120.0,
            work_plane_height: 0.0,
            beam_angle: 24.0,
            angle_mode: AngleMode::Full,
            spacing_factor: 1.1,
        },
    },
    Preset {
        id: "accent",
        label: "Narrow accent",
        inputs: SpacingInputs {
            ceiling_height: 108.0,
            work_plane_height: 36.0,
            beam_angle: 15.0,
            angle_mode: AngleMode::Half,
            spacing_factor: 1.0,
        },
    },
];

/// Look up a preset by its id.
pub fn preset_by_id(id: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.id == id)
}

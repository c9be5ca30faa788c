use spacing_core::{SpacingResult, format_feet_inches};

/// Shown when the work plane sits at or above the ceiling. Advisory only;
/// the zero-spacing result still renders.
pub const ADVISORY_ZERO_MH: &str = "Work plane is at or above the ceiling; spacing is zero.";
/// Shown when the half-angle reaches 90 degrees and the footprint diverges.
pub const ADVISORY_UNBOUNDED: &str =
    "Beam angle puts the half-angle at 90\u{b0}; the footprint is unbounded.";

/// Pick the advisory for a result, if any. Anomalies never block the
/// computation; they only annotate it.
pub fn advisory_for(r: &SpacingResult) -> Option<&'static str> {
    if r.mounting_height == 0.0 {
        Some(ADVISORY_ZERO_MH)
    } else if !r.touch_spacing.is_finite() {
        Some(ADVISORY_UNBOUNDED)
    } else {
        None
    }
}

/// Render the result record as the readout panel rows.
pub fn readout_html(r: &SpacingResult) -> String {
    let row = |label: &str, value: String| {
        format!(
            "<div class=\"row\"><span>{}</span><b>{}</b></div>",
            label, value
        )
    };
    let mut html = String::new();
    html.push_str(&row(
        "Mounting height",
        format_feet_inches(r.mounting_height),
    ));
    html.push_str(&row("Half-angle", format!("{:.1}\u{b0}", r.half_angle_deg)));
    html.push_str(&row("Beam radius", format_feet_inches(r.radius)));
    html.push_str(&row("Touch spacing", format_feet_inches(r.touch_spacing)));
    html.push_str(&row(
        "Recommended spacing",
        format_feet_inches(r.chosen_spacing),
    ));
    html.push_str(&row(
        "Overlap",
        format!(
            "{} ({:.1}%)",
            format_feet_inches(r.overlap),
            r.overlap_percent
        ),
    ));
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use spacing_core::{SpacingInputs, compute_spacing};

    #[test]
    fn advisory_flags_zero_mounting_height() {
        let r = compute_spacing(&SpacingInputs {
            ceiling_height: 36.0,
            work_plane_height: 96.0,
            ..SpacingInputs::default()
        });
        assert_eq!(advisory_for(&r), Some(ADVISORY_ZERO_MH));
    }

    #[test]
    fn advisory_flags_unbounded_footprint() {
        let r = SpacingResult {
            mounting_height: 72.0,
            half_angle_deg: 90.0,
            radius: f64::INFINITY,
            touch_spacing: f64::INFINITY,
            chosen_spacing: f64::INFINITY,
            ..SpacingResult::default()
        };
        assert_eq!(advisory_for(&r), Some(ADVISORY_UNBOUNDED));
    }

    #[test]
    fn no_advisory_for_a_nominal_scene() {
        let r = compute_spacing(&SpacingInputs::default());
        assert_eq!(advisory_for(&r), None);
    }

    #[test]
    fn readout_formats_lengths_as_feet_and_inches() {
        let r = compute_spacing(&SpacingInputs {
            spacing_factor: 0.9,
            ..SpacingInputs::default()
        });
        let html = readout_html(&r);
        assert!(html.contains("Mounting height"));
        assert!(html.contains("6'-0\""));
        assert!(html.contains("2'-10 6/8\""));
        assert!(html.contains("(10.0%)"));
    }
}

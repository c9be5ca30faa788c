use png::{BitDepth, ColorType, Encoder};
use serde::{Deserialize, Serialize};
use spacing_core::{SpacingResult, format_feet_inches};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Segment {
    pub a: Point,
    pub b: Point,
}

impl Segment {
    fn horizontal(x0: f64, x1: f64, y: f64) -> Segment {
        Segment {
            a: Point { x: x0, y },
            b: Point { x: x1, y },
        }
    }
}

/// Fixed canvas geometry for the schematic. The vertical span is purely
/// schematic: mounting height always renders at the same pixel height no
/// matter its real magnitude.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    /// Top offset of the ceiling line (px).
    pub ceiling_y: f64,
    /// Fixed pixel span between ceiling and work-plane lines.
    pub mounting_span: f64,
    /// Horizontal breathing room; 1.1 leaves 10% slack around the beams.
    pub breathing: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        CanvasConfig {
            width: 720.0,
            height: 320.0,
            margin: 24.0,
            ceiling_y: 60.0,
            mounting_span: 180.0,
            breathing: 1.1,
        }
    }
}

/// Pixel coordinates for one recomputation of the schematic.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Diagram {
    pub ceiling: Segment,
    pub work_plane: Segment,
    /// Left and right fixture points on the ceiling line.
    pub fixtures: [Point; 2],
    /// Cone outlines: two edges per fixture, ceiling point down to the
    /// work-plane landing at +-radius either side of the fixture.
    pub beam_edges: [Segment; 4],
    /// Dimension span between the two fixture points.
    pub spacing_dim: Segment,
    /// Dimension span across the footprint overlap; present only when the
    /// overlap is strictly positive (touching beams draw nothing).
    pub overlap_dim: Option<Segment>,
    pub px_per_inch: f64,
}

/// Derive the schematic coordinates for one spacing result.
///
/// Pure function of the result and the canvas constants. Zero, huge, or
/// non-finite lengths pass through without panicking; the output may then
/// be off-canvas or degenerate, which is acceptable for a schematic.
pub fn layout_diagram(r: &SpacingResult, cfg: &CanvasConfig) -> Diagram {
    let plane_y = cfg.ceiling_y + cfg.mounting_span;
    let drawable = cfg.width - 2.0 * cfg.margin;
    // max(1, ...) keeps a zero or negative total width from collapsing the
    // scale to infinity.
    let total_in = (r.chosen_spacing + 2.0 * r.radius).max(1.0);
    let px_per_inch = drawable / (total_in * cfg.breathing);

    let cx = cfg.width / 2.0;
    let half_px = r.chosen_spacing / 2.0 * px_per_inch;
    let left = Point {
        x: cx - half_px,
        y: cfg.ceiling_y,
    };
    let right = Point {
        x: cx + half_px,
        y: cfg.ceiling_y,
    };
    let r_px = r.radius * px_per_inch;
    let edge = |fx: f64, dx: f64| Segment {
        a: Point {
            x: fx,
            y: cfg.ceiling_y,
        },
        b: Point {
            x: fx + dx,
            y: plane_y,
        },
    };
    let overlap_dim = if r.overlap > 0.0 {
        // Right edge of the left footprint back to the left edge of the
        // right footprint.
        Some(Segment::horizontal(right.x - r_px, left.x + r_px, plane_y))
    } else {
        None
    };
    Diagram {
        ceiling: Segment::horizontal(cfg.margin, cfg.width - cfg.margin, cfg.ceiling_y),
        work_plane: Segment::horizontal(cfg.margin, cfg.width - cfg.margin, plane_y),
        fixtures: [left, right],
        beam_edges: [
            edge(left.x, -r_px),
            edge(left.x, r_px),
            edge(right.x, -r_px),
            edge(right.x, r_px),
        ],
        spacing_dim: Segment::horizontal(left.x, right.x, cfg.ceiling_y),
        overlap_dim,
        px_per_inch,
    }
}

fn svg_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn svg_line(s: &mut String, seg: &Segment, style: &str) {
    s.push_str(&format!(
        "<path d=\"M {:.2} {:.2} L {:.2} {:.2}\" {}/>\n",
        seg.a.x, seg.a.y, seg.b.x, seg.b.y, style
    ));
}

fn svg_text(s: &mut String, x: f64, y: f64, anchor: &str, txt: &str) {
    s.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"{}\" fill=\"#333\">{}</text>\n",
        x,
        y,
        anchor,
        svg_escape(txt)
    ));
}

/// Build the schematic as an SVG document. Returns the text plus pixel
/// dimensions for rasterization.
pub fn build_schematic_svg(r: &SpacingResult, cfg: &CanvasConfig) -> (String, u32, u32) {
    let d = layout_diagram(r, cfg);
    let w_px = cfg.width.ceil() as u32;
    let h_px = cfg.height.ceil() as u32;
    let mut s = String::new();
    s.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    s.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\" fill=\"none\" stroke-linecap=\"round\" font-family=\"sans-serif\" font-size=\"13\">\n",
        w_px, h_px, w_px, h_px
    ));
    s.push_str("<rect x=\"0\" y=\"0\" width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n");

    svg_line(&mut s, &d.ceiling, "stroke=\"#222\" stroke-width=\"2.4\"");
    svg_line(&mut s, &d.work_plane, "stroke=\"#888\" stroke-width=\"1.6\"");
    svg_text(
        &mut s,
        d.ceiling.a.x,
        d.ceiling.a.y - 8.0,
        "start",
        "Ceiling",
    );
    svg_text(
        &mut s,
        d.work_plane.a.x,
        d.work_plane.a.y + 16.0,
        "start",
        "Work plane",
    );

    for seg in &d.beam_edges {
        svg_line(&mut s, seg, "stroke=\"#c90\" stroke-width=\"1.8\"");
    }
    for f in &d.fixtures {
        s.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"4\" fill=\"#222\"/>\n",
            f.x, f.y
        ));
    }

    // Spacing dimension, lifted above the ceiling line for readability.
    let dim_y = d.spacing_dim.a.y - 22.0;
    let dim = Segment::horizontal(d.spacing_dim.a.x, d.spacing_dim.b.x, dim_y);
    svg_line(
        &mut s,
        &dim,
        "stroke=\"#36c\" stroke-width=\"1\" stroke-dasharray=\"4 3\"",
    );
    svg_text(
        &mut s,
        (dim.a.x + dim.b.x) / 2.0,
        dim_y - 5.0,
        "middle",
        &format!("Spacing {}", format_feet_inches(r.chosen_spacing)),
    );

    if let Some(od) = &d.overlap_dim {
        let oy = od.a.y + 20.0;
        let dim = Segment::horizontal(od.a.x, od.b.x, oy);
        svg_line(
            &mut s,
            &dim,
            "stroke=\"#c33\" stroke-width=\"1\" stroke-dasharray=\"4 3\"",
        );
        svg_text(
            &mut s,
            (dim.a.x + dim.b.x) / 2.0,
            oy + 14.0,
            "middle",
            &format!(
                "Overlap {} ({:.1}%)",
                format_feet_inches(r.overlap),
                r.overlap_percent
            ),
        );
    }

    // Mounting height note in the left margin.
    svg_text(
        &mut s,
        d.ceiling.a.x,
        (d.ceiling.a.y + d.work_plane.a.y) / 2.0,
        "start",
        &format!("MH {}", format_feet_inches(r.mounting_height)),
    );

    s.push_str("</svg>\n");
    (s, w_px, h_px)
}

/// Shared PNG encoder: RGBA -> PNG bytes (deterministic for same input).
pub fn encode_rgba_to_png_bytes(
    width: u32,
    height: u32,
    rgba: &[u8],
) -> Result<Vec<u8>, png::EncodingError> {
    let mut buf = Vec::new();
    {
        let mut enc = Encoder::new(&mut buf, width, height);
        enc.set_color(ColorType::Rgba);
        enc.set_depth(BitDepth::Eight);
        {
            let mut writer = enc.write_header()?;
            writer.write_image_data(rgba)?;
        }
        // enc drops here, releasing the &mut buf borrow
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spacing_core::{SpacingInputs, compute_spacing};

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() <= tol, "expected {} ~ {} (tol {})", a, b, tol);
    }

    fn touching() -> SpacingResult {
        compute_spacing(&SpacingInputs::default())
    }

    fn overlapping() -> SpacingResult {
        compute_spacing(&SpacingInputs {
            spacing_factor: 0.9,
            ..SpacingInputs::default()
        })
    }

    #[test]
    fn fixtures_center_on_the_canvas() {
        let cfg = CanvasConfig::default();
        let d = layout_diagram(&touching(), &cfg);
        let cx = cfg.width / 2.0;
        assert_close(cx - d.fixtures[0].x, d.fixtures[1].x - cx, 1e-9);
        assert_close(
            d.fixtures[1].x - d.fixtures[0].x,
            touching().chosen_spacing * d.px_per_inch,
            1e-9,
        );
        assert_eq!(d.fixtures[0].y, cfg.ceiling_y);
    }

    #[test]
    fn scale_fits_beams_inside_the_margins() {
        let cfg = CanvasConfig::default();
        let r = touching();
        let d = layout_diagram(&r, &cfg);
        let total = r.chosen_spacing + 2.0 * r.radius;
        assert_close(
            d.px_per_inch,
            (cfg.width - 2.0 * cfg.margin) / (total * cfg.breathing),
            1e-9,
        );
        // Outer beam landings stay inside the drawable area.
        let left_land = d.beam_edges[0].b.x;
        let right_land = d.beam_edges[3].b.x;
        assert!(left_land >= cfg.margin);
        assert!(right_land <= cfg.width - cfg.margin);
    }

    #[test]
    fn beam_edges_land_at_radius_either_side() {
        let cfg = CanvasConfig::default();
        let r = overlapping();
        let d = layout_diagram(&r, &cfg);
        let plane_y = cfg.ceiling_y + cfg.mounting_span;
        let r_px = r.radius * d.px_per_inch;
        assert_close(d.beam_edges[0].b.x, d.fixtures[0].x - r_px, 1e-9);
        assert_close(d.beam_edges[1].b.x, d.fixtures[0].x + r_px, 1e-9);
        assert_close(d.beam_edges[2].b.x, d.fixtures[1].x - r_px, 1e-9);
        assert_close(d.beam_edges[3].b.x, d.fixtures[1].x + r_px, 1e-9);
        for e in &d.beam_edges {
            assert_eq!(e.a.y, cfg.ceiling_y);
            assert_eq!(e.b.y, plane_y);
        }
    }

    #[test]
    fn overlap_dimension_spans_the_footprint_intersection() {
        let cfg = CanvasConfig::default();
        let r = overlapping();
        let d = layout_diagram(&r, &cfg);
        let od = d.overlap_dim.expect("overlap dim for s < 1");
        let r_px = r.radius * d.px_per_inch;
        assert_close(od.a.x, d.fixtures[1].x - r_px, 1e-9);
        assert_close(od.b.x, d.fixtures[0].x + r_px, 1e-9);
        assert_close(od.b.x - od.a.x, r.overlap * d.px_per_inch, 1e-9);
    }

    #[test]
    fn touching_beams_suppress_the_overlap_dimension() {
        let d = layout_diagram(&touching(), &CanvasConfig::default());
        assert!(d.overlap_dim.is_none());
        // Gapped beams as well.
        let gapped = compute_spacing(&SpacingInputs {
            spacing_factor: 1.2,
            ..SpacingInputs::default()
        });
        let d = layout_diagram(&gapped, &CanvasConfig::default());
        assert!(d.overlap_dim.is_none());
    }

    #[test]
    fn zero_result_keeps_a_finite_scale() {
        let zero = compute_spacing(&SpacingInputs {
            ceiling_height: 36.0,
            work_plane_height: 96.0,
            ..SpacingInputs::default()
        });
        let cfg = CanvasConfig::default();
        let d = layout_diagram(&zero, &cfg);
        assert_close(
            d.px_per_inch,
            (cfg.width - 2.0 * cfg.margin) / cfg.breathing,
            1e-9,
        );
        assert_close(d.fixtures[0].x, d.fixtures[1].x, 1e-9);
        assert!(d.overlap_dim.is_none());
    }

    #[test]
    fn non_finite_result_does_not_panic() {
        let r = compute_spacing(&SpacingInputs {
            beam_angle: 90.0,
            angle_mode: spacing_core::AngleMode::Half,
            ..SpacingInputs::default()
        });
        let d = layout_diagram(&r, &CanvasConfig::default());
        // Degenerate coordinates are acceptable; producing them must not be.
        let (svg, w, h) = build_schematic_svg(&r, &CanvasConfig::default());
        assert!(w > 0 && h > 0);
        assert!(svg.contains("</svg>"));
        let _ = d.px_per_inch;
    }

    #[test]
    fn svg_carries_formatted_dimension_labels() {
        let (svg, w, h) = build_schematic_svg(&overlapping(), &CanvasConfig::default());
        assert_eq!(w, 720);
        assert_eq!(h, 320);
        // chosen = 34.726" -> 2'-10 6/8"; overlap = 3.858" -> 0'-3 7/8"
        assert!(svg.contains("Spacing 2'-10 6/8\""));
        assert!(svg.contains("Overlap 0'-3 7/8\" (10.0%)"));
        assert!(svg.contains("MH 6'-0\""));
        assert!(svg.contains("Ceiling"));
        assert!(svg.contains("Work plane"));
    }

    #[test]
    fn svg_omits_overlap_annotation_when_beams_touch() {
        let (svg, _, _) = build_schematic_svg(&touching(), &CanvasConfig::default());
        assert!(!svg.contains("Overlap"));
    }

    #[test]
    fn diagram_serializes_for_the_ui() {
        let d = layout_diagram(&overlapping(), &CanvasConfig::default());
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("overlap_dim"));
        let back: Diagram = serde_json::from_str(&json).unwrap();
        assert!(back.overlap_dim.is_some());
    }

    #[test]
    fn png_helper_encodes_a_small_buffer() {
        let rgba = vec![255u8; 2 * 2 * 4];
        let bytes = encode_rgba_to_png_bytes(2, 2, &rgba).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}

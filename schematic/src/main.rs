use std::env;
use std::fs;

use schematic_core::{CanvasConfig, build_schematic_svg, encode_rgba_to_png_bytes};
use spacing_core::{SpacingInputs, compute_spacing, preset_by_id};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: schematic <scene.json|preset:<id>> <output.(svg|png)> [scale]");
        std::process::exit(2);
    }
    let input = &args[1];
    let output = &args[2];
    let scale: f64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(1.0);

    let inputs: SpacingInputs = if let Some(id) = input.strip_prefix("preset:") {
        match preset_by_id(id) {
            Some(p) => p.inputs,
            None => {
                eprintln!("unknown preset: {id}");
                std::process::exit(2);
            }
        }
    } else {
        let txt = fs::read_to_string(input)?;
        serde_json::from_str(&txt)?
    };

    let result = compute_spacing(&inputs);
    if result.mounting_height == 0.0 {
        eprintln!("warning: work plane is at or above the ceiling; spacing is zero");
    }
    if !result.touch_spacing.is_finite() {
        eprintln!("warning: beam angle makes the footprint unbounded");
    }

    let base = CanvasConfig::default();
    let cfg = CanvasConfig {
        width: base.width * scale,
        height: base.height * scale,
        margin: base.margin * scale,
        ceiling_y: base.ceiling_y * scale,
        mounting_span: base.mounting_span * scale,
        breathing: base.breathing,
    };
    let (svg, w_px, h_px) = build_schematic_svg(&result, &cfg);

    if output.ends_with(".svg") {
        fs::write(output, svg)?;
        return Ok(());
    }
    if !output.ends_with(".png") {
        eprintln!("output must end in .svg or .png");
        std::process::exit(2);
    }

    // Rasterize: SVG -> RGBA -> deterministic PNG.
    let mut opt = usvg::Options::default();
    let mut fontdb = usvg::fontdb::Database::new();
    fontdb.load_system_fonts();
    opt.fontdb = std::sync::Arc::new(fontdb);
    let tree = usvg::Tree::from_str(&svg, &opt).map_err(|e| format!("SVG parse error: {e:?}"))?;
    let mut pixmap = tiny_skia::Pixmap::new(w_px, h_px).ok_or("pixmap alloc failed")?;
    let mut pm = pixmap.as_mut();
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pm);
    let bytes = encode_rgba_to_png_bytes(w_px, h_px, pixmap.data())?;
    fs::write(output, bytes)?;
    Ok(())
}

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Array;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Blob, CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, HtmlInputElement,
    HtmlSelectElement, Url,
};

mod canvas;
mod constants;
mod models;
mod state;
mod utils;

use canvas::{set_fill_style, set_line_dash, set_stroke_style};
use constants::{ANGLE_STEP_DEG, FACTOR_STEP, HEIGHT_MAX_IN, HEIGHT_MIN_IN, HEIGHT_STEP_IN};
use models::{advisory_for, readout_html};
use state::{STATE, State};
use utils::{get_query_f64, get_query_param, log, sync_canvas_size};

use schematic_core::{CanvasConfig, Segment, build_schematic_svg, layout_diagram};
use spacing_core::{
    AngleMode, BEAM_ANGLE_MAX, BEAM_ANGLE_MIN, PRESETS, SPACING_FACTOR_MAX, SPACING_FACTOR_MIN,
    SpacingInputs, SpacingResult, clamp_spacing_factor, compute_spacing, format_feet_inches,
    preset_by_id,
};

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas = document
        .get_element_by_id("schematic")
        .ok_or_else(|| JsValue::from_str("missing #schematic canvas"))?
        .dyn_into::<HtmlCanvasElement>()?;
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()?;

    let search = window.location().search().unwrap_or_default();
    let inputs = inputs_from_query(&search);

    let state = Rc::new(RefCell::new(State {
        window,
        document,
        canvas,
        ctx,
        inputs,
        initial_inputs: inputs,
    }));
    STATE.with(|s| *s.borrow_mut() = Some(state.clone()));

    attach_ui(state.clone())?;
    {
        let mut s = state.borrow_mut();
        sync_widgets(&s);
        draw(&mut s);
    }
    log("spacing calculator ready");
    Ok(())
}

/// Build the start-up tuple from `?preset=&c=&d=&b=&mode=&s=`. Individual
/// parameters override the preset; the spacing factor counts as manual
/// entry and is clamped.
fn inputs_from_query(search: &str) -> SpacingInputs {
    let mut inputs = get_query_param(search, "preset")
        .and_then(|id| preset_by_id(&id).map(|p| p.inputs))
        .unwrap_or_default();
    if let Some(v) = get_query_f64(search, "c") {
        inputs.ceiling_height = v;
    }
    if let Some(v) = get_query_f64(search, "d") {
        inputs.work_plane_height = v;
    }
    if let Some(v) = get_query_f64(search, "b") {
        inputs.beam_angle = v;
    }
    if let Some(m) = get_query_param(search, "mode") {
        inputs.angle_mode = if m.eq_ignore_ascii_case("half") {
            AngleMode::Half
        } else {
            AngleMode::Full
        };
    }
    if let Some(v) = get_query_f64(search, "s") {
        inputs.spacing_factor = clamp_spacing_factor(v);
    }
    inputs
}

/// Canvas geometry for the current backing-store size. The reference
/// 720x320 constants scale uniformly with the canvas height so the
/// schematic keeps its proportions across DPR changes.
fn view_config(state: &State) -> CanvasConfig {
    let base = CanvasConfig::default();
    let w = (state.canvas.width() as f64).max(1.0);
    let h = (state.canvas.height() as f64).max(1.0);
    let k = h / base.height;
    CanvasConfig {
        width: w,
        height: h,
        margin: base.margin * k,
        ceiling_y: base.ceiling_y * k,
        mounting_span: base.mounting_span * k,
        breathing: base.breathing,
    }
}

fn stroke_segment(ctx: &CanvasRenderingContext2d, s: &Segment) {
    ctx.begin_path();
    ctx.move_to(s.a.x, s.a.y);
    ctx.line_to(s.b.x, s.b.y);
    ctx.stroke();
}

fn stroke_line(ctx: &CanvasRenderingContext2d, x0: f64, y0: f64, x1: f64, y1: f64) {
    ctx.begin_path();
    ctx.move_to(x0, y0);
    ctx.line_to(x1, y1);
    ctx.stroke();
}

/// Full redraw: recompute the result from the current inputs, lay out the
/// schematic, and repaint the canvas and the side panels.
fn draw(state: &mut State) {
    sync_canvas_size(state);
    let cfg = view_config(state);
    let result = compute_spacing(&state.inputs);
    let d = layout_diagram(&result, &cfg);
    let k = cfg.height / 320.0;
    let ctx = &state.ctx;
    ctx.clear_rect(0.0, 0.0, cfg.width, cfg.height);

    // Room lines.
    ctx.set_line_width(2.4 * k);
    set_stroke_style(ctx, "#222");
    stroke_segment(ctx, &d.ceiling);
    ctx.set_line_width(1.6 * k);
    set_stroke_style(ctx, "#888");
    stroke_segment(ctx, &d.work_plane);

    // Beam cones as outlines.
    ctx.set_line_width(1.8 * k);
    set_stroke_style(ctx, "#c90");
    for e in &d.beam_edges {
        stroke_segment(ctx, e);
    }

    // Fixture points.
    set_fill_style(ctx, "#222");
    for f in &d.fixtures {
        ctx.begin_path();
        let _ = ctx.arc(f.x, f.y, 4.0 * k, 0.0, std::f64::consts::TAU);
        ctx.fill();
    }

    // Labels and dimension annotations.
    let font_px = (13.0 * k).round().max(9.0);
    ctx.set_font(&format!("{}px sans-serif", font_px));
    set_fill_style(ctx, "#333");
    ctx.set_text_baseline("alphabetic");
    ctx.set_text_align("left");
    let _ = ctx.fill_text("Ceiling", d.ceiling.a.x, d.ceiling.a.y - 8.0 * k);
    let _ = ctx.fill_text("Work plane", d.work_plane.a.x, d.work_plane.a.y + 16.0 * k);
    let _ = ctx.fill_text(
        &format!("MH {}", format_feet_inches(result.mounting_height)),
        d.ceiling.a.x,
        (d.ceiling.a.y + d.work_plane.a.y) / 2.0,
    );

    ctx.set_text_align("center");
    ctx.set_line_width(1.0 * k);
    set_line_dash(ctx, &[4.0 * k, 3.0 * k]);

    set_stroke_style(ctx, "#36c");
    let dim_y = d.spacing_dim.a.y - 22.0 * k;
    stroke_line(ctx, d.spacing_dim.a.x, dim_y, d.spacing_dim.b.x, dim_y);
    let _ = ctx.fill_text(
        &format!("Spacing {}", format_feet_inches(result.chosen_spacing)),
        (d.spacing_dim.a.x + d.spacing_dim.b.x) / 2.0,
        dim_y - 5.0 * k,
    );

    if let Some(od) = &d.overlap_dim {
        set_stroke_style(ctx, "#c33");
        let oy = od.a.y + 20.0 * k;
        stroke_line(ctx, od.a.x, oy, od.b.x, oy);
        let _ = ctx.fill_text(
            &format!(
                "Overlap {} ({:.1}%)",
                format_feet_inches(result.overlap),
                result.overlap_percent
            ),
            (od.a.x + od.b.x) / 2.0,
            oy + 14.0 * k,
        );
    }
    set_line_dash(ctx, &[]);

    update_readout_dom(state, &result);
    update_advisory_dom(state, &result);
}

fn update_readout_dom(state: &State, r: &SpacingResult) {
    if let Some(el) = state.document.get_element_by_id("readout")
        && let Ok(el) = el.dyn_into::<HtmlElement>()
    {
        el.set_inner_html(&readout_html(r));
    }
}

fn update_advisory_dom(state: &State, r: &SpacingResult) {
    if let Some(el) = state.document.get_element_by_id("advisory")
        && let Ok(el) = el.dyn_into::<HtmlElement>()
    {
        el.set_inner_text(advisory_for(r).unwrap_or(""));
    }
}

fn save_text_as_file(document: &Document, filename: &str, text: &str) -> Result<(), JsValue> {
    let array = Array::new();
    array.push(&JsValue::from_str(text));
    let blob = Blob::new_with_str_sequence(&array)?;
    let url = Url::create_object_url_with_blob(&blob)?;
    let a = document.create_element("a")?.dyn_into::<HtmlElement>()?;
    a.set_attribute("href", &url)?;
    a.set_attribute("download", filename)?;
    a.click();
    Url::revoke_object_url(&url)?;
    Ok(())
}

fn set_input_value(document: &Document, id: &str, v: f64) {
    if let Some(el) = document.get_element_by_id(id)
        && let Ok(el) = el.dyn_into::<HtmlInputElement>()
    {
        el.set_value(&v.to_string());
    }
}

/// Push the current input tuple back into the widgets (presets, reset,
/// start-up). Programmatic `set_value` fires no input events, so this
/// never re-enters `draw`.
fn sync_widgets(state: &State) {
    let doc = &state.document;
    let i = &state.inputs;
    for (slider, number, v) in [
        ("ceilingSlider", "ceilingNumber", i.ceiling_height),
        ("planeSlider", "planeNumber", i.work_plane_height),
        ("angleSlider", "angleNumber", i.beam_angle),
        ("factorSlider", "factorNumber", i.spacing_factor),
    ] {
        set_input_value(doc, slider, v);
        set_input_value(doc, number, v);
    }
    if let Some(el) = doc.get_element_by_id("modeSel")
        && let Ok(sel) = el.dyn_into::<HtmlSelectElement>()
    {
        sel.set_value(match i.angle_mode {
            AngleMode::Full => "full",
            AngleMode::Half => "half",
        });
    }
}

/// Wire a slider+number pair kept in sync; every edit recomputes and
/// redraws. `clamp_entry` applies the range to typed values as well
/// (spacing factor); otherwise the range only bounds the widgets.
#[allow(clippy::too_many_arguments)]
fn wire_pair(
    state: Rc<RefCell<State>>,
    slider_id: &str,
    number_id: &str,
    min: f64,
    max: f64,
    step: f64,
    clamp_entry: bool,
    apply: impl Fn(&mut SpacingInputs, f64) + Clone + 'static,
) -> Result<(), JsValue> {
    let doc = state.borrow().document.clone();
    let (Some(sl), Some(nb)) = (
        doc.get_element_by_id(slider_id),
        doc.get_element_by_id(number_id),
    ) else {
        return Ok(());
    };
    let (Ok(sl), Ok(nb)) = (
        sl.dyn_into::<HtmlInputElement>(),
        nb.dyn_into::<HtmlInputElement>(),
    ) else {
        return Ok(());
    };
    for el in [&sl, &nb] {
        el.set_min(&min.to_string());
        el.set_max(&max.to_string());
        el.set_step(&step.to_string());
    }

    // Slider -> number + state
    {
        let st = state.clone();
        let nb1 = nb.clone();
        let sl_read = sl.clone();
        let apply1 = apply.clone();
        let oninput = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            if let Ok(v) = sl_read.value().parse::<f64>() {
                nb1.set_value(&v.to_string());
                let mut s = st.borrow_mut();
                apply1(&mut s.inputs, v);
                draw(&mut s);
            }
        }));
        sl.set_oninput(Some(oninput.as_ref().unchecked_ref()));
        oninput.forget();
    }

    // Number -> slider + state
    {
        let st = state.clone();
        let sl2 = sl.clone();
        let nb_read = nb.clone();
        let oninput = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            if let Ok(mut v) = nb_read.value().parse::<f64>() {
                if clamp_entry {
                    v = v.clamp(min, max);
                    nb_read.set_value(&v.to_string());
                }
                sl2.set_value(&v.to_string());
                let mut s = st.borrow_mut();
                apply(&mut s.inputs, v);
                draw(&mut s);
            }
        }));
        nb.set_oninput(Some(oninput.as_ref().unchecked_ref()));
        oninput.forget();
    }
    Ok(())
}

fn attach_ui(state: Rc<RefCell<State>>) -> Result<(), JsValue> {
    let doc = state.borrow().document.clone();

    wire_pair(
        state.clone(),
        "ceilingSlider",
        "ceilingNumber",
        HEIGHT_MIN_IN,
        HEIGHT_MAX_IN,
        HEIGHT_STEP_IN,
        false,
        |i, v| i.ceiling_height = v,
    )?;
    wire_pair(
        state.clone(),
        "planeSlider",
        "planeNumber",
        HEIGHT_MIN_IN,
        HEIGHT_MAX_IN,
        HEIGHT_STEP_IN,
        false,
        |i, v| i.work_plane_height = v,
    )?;
    // The widget range is [1, 170]; programmatic values are left alone.
    wire_pair(
        state.clone(),
        "angleSlider",
        "angleNumber",
        BEAM_ANGLE_MIN,
        BEAM_ANGLE_MAX,
        ANGLE_STEP_DEG,
        false,
        |i, v| i.beam_angle = v,
    )?;
    // Manual spacing-factor entry clamps to the supported range.
    wire_pair(
        state.clone(),
        "factorSlider",
        "factorNumber",
        SPACING_FACTOR_MIN,
        SPACING_FACTOR_MAX,
        FACTOR_STEP,
        true,
        |i, v| i.spacing_factor = v,
    )?;

    // Angle-mode selector (full cone angle vs half-angle).
    if let Some(sel) = doc.get_element_by_id("modeSel") {
        let sel: HtmlElement = sel.dyn_into().unwrap();
        let st = state.clone();
        let onchange = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            let mut s = st.borrow_mut();
            if let Some(el) = s.document.get_element_by_id("modeSel")
                && let Ok(sel) = el.dyn_into::<HtmlSelectElement>()
            {
                s.inputs.angle_mode = if sel.value() == "half" {
                    AngleMode::Half
                } else {
                    AngleMode::Full
                };
                draw(&mut s);
            }
        }));
        sel.set_onchange(Some(onchange.as_ref().unchecked_ref()));
        onchange.forget();
    }

    // Preset buttons set canonical tuples.
    for p in PRESETS {
        if let Some(btn) = doc.get_element_by_id(&format!("preset-{}", p.id)) {
            let btn: HtmlElement = btn.dyn_into().unwrap();
            let st = state.clone();
            let inputs = p.inputs;
            let onclick = Closure::<dyn FnMut()>::wrap(Box::new(move || {
                let mut s = st.borrow_mut();
                s.inputs = inputs;
                sync_widgets(&s);
                draw(&mut s);
            }));
            btn.set_onclick(Some(onclick.as_ref().unchecked_ref()));
            onclick.forget();
        }
    }

    // Reset button (restore the start-up tuple).
    if let Some(btn) = doc.get_element_by_id("resetInputs") {
        let btn: HtmlElement = btn.dyn_into().unwrap();
        let st = state.clone();
        let onclick = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            let mut s = st.borrow_mut();
            s.inputs = s.initial_inputs;
            sync_widgets(&s);
            draw(&mut s);
        }));
        btn.set_onclick(Some(onclick.as_ref().unchecked_ref()));
        onclick.forget();
    }

    // Export the current schematic as SVG.
    if let Some(btn) = doc.get_element_by_id("exportSvg") {
        let btn: HtmlElement = btn.dyn_into().unwrap();
        let st = state.clone();
        let onclick = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            let s = st.borrow();
            let result = compute_spacing(&s.inputs);
            let (svg, _, _) = build_schematic_svg(&result, &view_config(&s));
            let _ = save_text_as_file(&s.document, "schematic.svg", &svg);
        }));
        btn.set_onclick(Some(onclick.as_ref().unchecked_ref()));
        onclick.forget();
    }

    // Save the scene JSON (feeds the schematic CLI).
    if let Some(btn) = doc.get_element_by_id("saveScene") {
        let btn: HtmlElement = btn.dyn_into().unwrap();
        let st = state.clone();
        let onclick = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            let s = st.borrow();
            let json = serde_json::to_string_pretty(&s.inputs).unwrap_or("{}".to_string());
            let _ = save_text_as_file(&s.document, "scene.json", &json);
        }));
        btn.set_onclick(Some(onclick.as_ref().unchecked_ref()));
        onclick.forget();
    }

    // Keep the schematic crisp across window and DPR changes.
    {
        let st = state.clone();
        let onresize = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            let mut s = st.borrow_mut();
            draw(&mut s);
        }));
        state
            .borrow()
            .window
            .add_event_listener_with_callback("resize", onresize.as_ref().unchecked_ref())?;
        onresize.forget();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_overrides_layer_over_preset() {
        let i = inputs_from_query("?preset=counter&b=45");
        assert_eq!(i.ceiling_height, 96.0);
        assert_eq!(i.beam_angle, 45.0);
        assert_eq!(i.spacing_factor, 0.9);
    }

    #[test]
    fn query_spacing_factor_counts_as_manual_entry() {
        let i = inputs_from_query("?s=5.0");
        assert_eq!(i.spacing_factor, SPACING_FACTOR_MAX);
    }

    #[test]
    fn query_mode_selects_half_angle() {
        let i = inputs_from_query("?mode=half&b=15");
        assert_eq!(i.angle_mode, AngleMode::Half);
        let r = compute_spacing(&i);
        assert!((r.touch_spacing - 38.585).abs() < 0.01);
    }

    #[test]
    fn empty_query_falls_back_to_defaults() {
        let i = inputs_from_query("");
        assert_eq!(i.ceiling_height, 108.0);
        assert_eq!(i.angle_mode, AngleMode::Full);
    }
}

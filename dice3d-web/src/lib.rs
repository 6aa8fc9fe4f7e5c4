/// Dice3D Web - canvas front end compiled to WASM
///
/// Wraps a [`DiceSimulation`] and paints its frames with the 2D canvas API.
/// The host page forwards pointer events, calls `tick` from
/// `requestAnimationFrame`, then `render`.
use dice3d_core::{
    presets, AnimationConfig, Color, ConfigError, DiceEvent, DiceLayer, DiceSimulation,
    RenderedFace, ScreenPoint, SimulationSettings,
};
use std::time::Duration;
use tracing::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// Returned by `tick` when the display value did not change
pub const NO_CHANGE: i32 = -1;

/// Longest step `tick` simulates; a backgrounded tab resumes from here
pub const MAX_TICK_MS: f64 = 1000.0;

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Resolve a preset name: `classic`, `nested`, `crystal`, `cavity`, or a
/// value `0`..`6`
pub fn preset_layers(name: &str) -> Result<Vec<DiceLayer>, ConfigError> {
    match name {
        "classic" => Ok(presets::classic()),
        "nested" => presets::nested(),
        "crystal" => presets::crystal(),
        "cavity" => presets::with_cavity(presets::nested()?),
        other => match other.parse::<u8>() {
            Ok(value) => presets::for_value(value),
            Err(_) => Err(ConfigError::Setting {
                field: "preset",
                reason: format!("unknown preset '{other}'"),
            }),
        },
    }
}

/// CSS `rgba()` string for a color
pub fn css_color(color: Color) -> String {
    let (r, g, b) = color.to_rgb8();
    format!("rgba({r}, {g}, {b}, {:.3})", color.a.clamp(0.0, 1.0))
}

/// Frame step for a host-reported delta, clamped to `0..=MAX_TICK_MS`.
/// NaN and negative deltas become zero.
pub fn tick_duration(dt_ms: f64) -> Duration {
    let dt_ms = if dt_ms.is_nan() {
        0.0
    } else {
        dt_ms.clamp(0.0, MAX_TICK_MS)
    };
    Duration::from_secs_f64(dt_ms / 1000.0)
}

/// Last display value announced in `events`, or [`NO_CHANGE`]
pub fn latest_value(events: &[DiceEvent]) -> i32 {
    events
        .iter()
        .rev()
        .find_map(|event| match event {
            DiceEvent::ValueChanged(value) => Some(i32::from(*value)),
            DiceEvent::StateChanged(_) => None,
        })
        .unwrap_or(NO_CHANGE)
}

#[wasm_bindgen]
pub struct WebDice {
    simulation: DiceSimulation,
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

#[wasm_bindgen]
impl WebDice {
    /// Attach to the canvas with id `canvas_id`. `settings_json` may hold a
    /// partial settings object.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_id: &str,
        preset: &str,
        seed: u64,
        settings_json: Option<String>,
    ) -> Result<WebDice, JsValue> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("no document available"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element with id '{canvas_id}'")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str(&format!("'{canvas_id}' is not a canvas")))?;
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| JsValue::from_str("unexpected context type"))?;

        let settings = match settings_json {
            Some(json) => SimulationSettings::from_json_str(&json).map_err(to_js)?,
            None => SimulationSettings::default(),
        };
        let layers = preset_layers(preset).map_err(to_js)?;
        let simulation = DiceSimulation::new(layers, settings, seed).map_err(to_js)?;
        debug!(canvas_id, preset, "web dice attached");

        Ok(WebDice {
            simulation,
            canvas,
            context,
        })
    }

    /// Returns false when the die ignores input (mid-roll)
    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        self.simulation.drag_start(Some(ScreenPoint::new(x, y)))
    }

    pub fn pointer_move(&mut self, dx: f32, dy: f32, x: f32, y: f32) -> bool {
        self.simulation.drag(dx, dy, Some(ScreenPoint::new(x, y)))
    }

    pub fn pointer_up(&mut self) {
        self.simulation.drag_end();
    }

    pub fn roll_to(
        &mut self,
        value: u8,
        rotations_x: f32,
        rotations_y: f32,
        duration_ms: u32,
    ) -> Result<(), JsValue> {
        let config =
            AnimationConfig::roll_to(value, rotations_x, rotations_y, u64::from(duration_ms))
                .map_err(to_js)?;
        self.simulation.roll_to(config).map_err(to_js)?;
        Ok(())
    }

    pub fn set_parent_interactive(&mut self, interactive: bool) {
        self.simulation.set_parent_interactive(interactive);
    }

    /// Current display value, 0 while rolling
    pub fn value(&self) -> u8 {
        self.simulation.display_value()
    }

    pub fn state(&self) -> String {
        format!("{:?}", self.simulation.state())
    }

    /// Advance by `dt_ms` milliseconds, at most [`MAX_TICK_MS`]. Returns the
    /// new display value if it changed during this step, otherwise -1.
    pub fn tick(&mut self, dt_ms: f64) -> i32 {
        latest_value(&self.simulation.tick(tick_duration(dt_ms)))
    }

    pub fn render(&self) -> Result<(), JsValue> {
        let width = self.canvas.width() as f32;
        let height = self.canvas.height() as f32;
        let ctx = &self.context;
        ctx.clear_rect(0.0, 0.0, f64::from(width), f64::from(height));

        let viewport = self.simulation.viewport(width, height);
        for face in self.simulation.frame(&viewport) {
            self.draw_face(&face);
        }
        Ok(())
    }
}

impl WebDice {
    fn trace_path(&self, points: &[ScreenPoint]) {
        let ctx = &self.context;
        ctx.begin_path();
        for (i, p) in points.iter().enumerate() {
            if i == 0 {
                ctx.move_to(f64::from(p.x), f64::from(p.y));
            } else {
                ctx.line_to(f64::from(p.x), f64::from(p.y));
            }
        }
        ctx.close_path();
    }

    fn draw_face(&self, face: &RenderedFace) {
        let ctx = &self.context;
        self.trace_path(&face.polygon);
        ctx.set_fill_style_str(&css_color(face.fill));
        ctx.fill();

        if let Some(edge) = face.edge {
            ctx.set_line_width(1.0);
            ctx.set_stroke_style_str(&css_color(edge));
            ctx.stroke();
        }

        let pip_fill = css_color(face.pip_color.with_alpha(face.fill.a));
        for pip in &face.pips {
            self.trace_path(pip);
            ctx.set_fill_style_str(&pip_fill);
            ctx.fill();
        }
    }
}

/// ASCII rasterizer for terminal rendering of dice frames
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use dice3d_core::{RenderedFace, ScreenPoint};
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Glyph used for pips
const PIP_CHAR: char = 'o';

/// Faces at least this opaque replace the glyph below them; fainter ones only tint it
const GLYPH_ALPHA: f32 = 0.5;

/// Upper bound on samples along one edge, for wildly off-screen corners
const MAX_EDGE_SAMPLES: usize = 4096;

/// Terminal cells are roughly twice as tall as they are wide
pub const CELL_ASPECT: f32 = 2.0;

/// ASCII renderer that paints projected dice faces into a character grid.
///
/// Faces arrive already sorted far to near, so later polygons simply
/// overwrite earlier ones.
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    char_buffer: Vec<char>,
    color_buffer: Vec<[f32; 3]>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            char_buffer: vec![' '; size],
            color_buffer: vec![[0.0; 3]; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Width of the square-celled surface the simulation should project onto
    pub fn logical_width(&self) -> f32 {
        self.width as f32 / CELL_ASPECT
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.char_buffer.fill(' ');
        self.color_buffer.fill([0.0; 3]);
    }

    /// Glyph and 8-bit color of a cell
    pub fn cell(&self, x: usize, y: usize) -> Option<(char, (u8, u8, u8))> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y * self.width + x;
        let [r, g, b] = self.color_buffer[idx];
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Some((self.char_buffer[idx], (q(r), q(g), q(b))))
    }

    /// Paint faces in the given order, stretching x by [`CELL_ASPECT`]
    pub fn render_faces(&mut self, faces: &[RenderedFace]) {
        for face in faces {
            let polygon: Vec<(f32, f32)> = face.polygon.iter().map(stretch).collect();
            let glyph = shade_char(face.brightness);
            let rgb = [face.fill.r, face.fill.g, face.fill.b];
            self.fill_polygon(&polygon, glyph, rgb, face.fill.a);
            if let Some(edge) = face.edge {
                self.stroke_polygon(&polygon, [edge.r, edge.g, edge.b], edge.a);
            }

            let pip_rgb = [face.pip_color.r, face.pip_color.g, face.pip_color.b];
            for pip in &face.pips {
                let outline: Vec<(f32, f32)> = pip.iter().map(stretch).collect();
                self.fill_polygon(&outline, PIP_CHAR, pip_rgb, face.fill.a);
            }
        }
    }

    /// Fill a convex polygon as a triangle fan. Each covered cell is
    /// blended once even where fan triangles share an edge.
    fn fill_polygon(&mut self, points: &[(f32, f32)], glyph: char, rgb: [f32; 3], alpha: f32) {
        if points.len() < 3 || alpha <= 0.0 {
            return;
        }

        let (mut min_x, mut max_x) = (f32::INFINITY, f32::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY);
        for &(x, y) in points {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
        if !(min_x.is_finite() && max_x.is_finite() && min_y.is_finite() && max_y.is_finite()) {
            return;
        }

        // Clip to screen bounds
        let min_x = (min_x.floor() as i32).max(0);
        let max_x = (max_x.ceil() as i32).min(self.width as i32 - 1);
        let min_y = (min_y.floor() as i32).max(0);
        let max_y = (max_y.ceil() as i32).min(self.height as i32 - 1);

        let alpha = alpha.min(1.0);
        let anchor = points[0];
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x as f32 + 0.5, y as f32 + 0.5);
                let covered = points[1..].windows(2).any(|edge| {
                    barycentric(anchor, edge[0], edge[1], p)
                        .is_some_and(|(w0, w1, w2)| w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0)
                });
                if !covered {
                    continue;
                }

                let idx = y as usize * self.width + x as usize;
                let cell = &mut self.color_buffer[idx];
                for (c, src) in cell.iter_mut().zip(rgb) {
                    *c = *c * (1.0 - alpha) + src * alpha;
                }
                if alpha >= GLYPH_ALPHA {
                    self.char_buffer[idx] = glyph;
                }
            }
        }
    }

    /// Outline a polygon with slope glyphs. Edges always replace the glyph
    /// below so translucent layers still show their silhouette.
    fn stroke_polygon(&mut self, points: &[(f32, f32)], rgb: [f32; 3], alpha: f32) {
        if points.len() < 2 || points.iter().any(|p| !(p.0.is_finite() && p.1.is_finite())) {
            return;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        for (i, &from) in points.iter().enumerate() {
            let to = points[(i + 1) % points.len()];
            let (dx, dy) = (to.0 - from.0, to.1 - from.1);
            let glyph = edge_char(dx, dy);
            let samples = (dx.abs().max(dy.abs()).ceil() as usize).clamp(1, MAX_EDGE_SAMPLES);
            for step in 0..=samples {
                let t = step as f32 / samples as f32;
                let (x, y) = ((from.0 + dx * t).floor(), (from.1 + dy * t).floor());
                if x < 0.0 || y < 0.0 || x >= self.width as f32 || y >= self.height as f32 {
                    continue;
                }
                let idx = y as usize * self.width + x as usize;
                for (c, src) in self.color_buffer[idx].iter_mut().zip(rgb) {
                    *c = *c * (1.0 - alpha) + src * alpha;
                }
                self.char_buffer[idx] = glyph;
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for x in 0..self.width {
                let Some((c, (r, g, b))) = self.cell(x, y) else {
                    continue;
                };
                let color = Color::Rgb { r, g, b };
                if current != Some(color) {
                    writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                writer.queue(Print(c))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn stretch(p: &ScreenPoint) -> (f32, f32) {
    (p.x * CELL_ASPECT, p.y)
}

/// Map a brightness to a ramp glyph; lit faces never fall to blank
fn shade_char(brightness: f32) -> char {
    let steps = (LUMINOSITY_RAMP.len() - 2) as f32;
    let index = 1 + (brightness.clamp(0.0, 1.0) * steps).round() as usize;
    LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)]
}

/// Line glyph for a segment direction, y growing downward
fn edge_char(dx: f32, dy: f32) -> char {
    if dy.abs() <= dx.abs() * 0.5 {
        '-'
    } else if dx.abs() <= dy.abs() * 0.5 {
        '|'
    } else if (dx > 0.0) == (dy > 0.0) {
        '\\'
    } else {
        '/'
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

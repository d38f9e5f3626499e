use rustybuzz::ttf_parser::{self, GlyphId};
use rustybuzz::Variation;
use strum::{AsRefStr, Display, EnumString};

use crate::error::{DrawError, Result};
use crate::geom::coordinate::Point;
use crate::geom::path::BezierPath;
use crate::text::font::FontRef;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// A glyph placed relative to the run origin, y up, in user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapedGlyph {
    pub id: u16,
    pub cluster: u32,
    pub x: f64,
    pub y: f64,
}

/// Output of shaping one string with one font at one size.
#[derive(Debug, Clone)]
pub struct GlyphRun {
    font: FontRef,
    size: f64,
    variations: Vec<Variation>,
    glyphs: Vec<ShapedGlyph>,
    end_pos: (f64, f64),
    line_spacing: f64,
}

impl GlyphRun {
    pub(crate) fn new(
        font: FontRef,
        size: f64,
        variations: Vec<Variation>,
        glyphs: Vec<ShapedGlyph>,
        end_pos: (f64, f64),
        line_spacing: f64,
    ) -> Self {
        GlyphRun {
            font,
            size,
            variations,
            glyphs,
            end_pos,
            line_spacing,
        }
    }

    /// Pen position after the last glyph; `.0` is the advance width.
    pub fn end_pos(&self) -> (f64, f64) {
        self.end_pos
    }

    pub fn line_spacing(&self) -> f64 {
        self.line_spacing
    }

    pub fn font(&self) -> &FontRef {
        &self.font
    }

    pub fn size(&self) -> f64 {
        self.size
    }
}

/// Glyph outlines of a run laid out on a baseline at y = 0, y down.
#[derive(Debug, Clone)]
pub struct TextBlob {
    path: BezierPath,
    glyph_count: usize,
}

impl TextBlob {
    pub fn from_run(run: &GlyphRun, align: TextAlign) -> Result<Self> {
        let mut face = run.font.face()?;
        if !run.variations.is_empty() {
            face.set_variations(&run.variations);
        }
        let metrics: &ttf_parser::Face = face.as_ref();
        let scale = run.size / metrics.units_per_em() as f64;
        let width = run.end_pos.0;
        let shift = match align {
            TextAlign::Left => 0.0,
            TextAlign::Center => -width / 2.0,
            TextAlign::Right => -width,
        };

        let mut path = BezierPath::new();
        for glyph in &run.glyphs {
            let mut sink = OutlineSink {
                path: &mut path,
                scale,
                dx: glyph.x + shift,
                dy: -glyph.y,
                error: None,
            };
            // glyphs without outlines (spaces) return None
            let _ = metrics.outline_glyph(GlyphId(glyph.id), &mut sink);
            if let Some(err) = sink.error {
                return Err(err);
            }
        }
        Ok(TextBlob {
            path,
            glyph_count: run.glyphs.len(),
        })
    }

    pub fn path(&self) -> &BezierPath {
        &self.path
    }

    pub fn glyph_count(&self) -> usize {
        self.glyph_count
    }
}

struct OutlineSink<'a> {
    path: &'a mut BezierPath,
    scale: f64,
    dx: f64,
    dy: f64,
    error: Option<DrawError>,
}

impl OutlineSink<'_> {
    fn map(&self, x: f32, y: f32) -> Point {
        Point::new(
            self.dx + x as f64 * self.scale,
            self.dy - y as f64 * self.scale,
        )
    }

    fn keep(&mut self, result: Result<()>) {
        if let Err(err) = result {
            self.error.get_or_insert(err);
        }
    }
}

impl ttf_parser::OutlineBuilder for OutlineSink<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        self.path.move_to(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        let result = self.path.line_to(p);
        self.keep(result);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (c, p) = (self.map(x1, y1), self.map(x, y));
        let result = self.path.qcurve_to(c, p);
        self.keep(result);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (c1, c2, p) = (self.map(x1, y1), self.map(x2, y2), self.map(x, y));
        let result = self.path.curve_to(c1, c2, p);
        self.keep(result);
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

use std::collections::BTreeMap;
use std::str::FromStr;

use log::debug;
use rustybuzz::ttf_parser::{self, Tag};
use rustybuzz::{Feature, Language, UnicodeBuffer, Variation};

use crate::error::Result;
use crate::text::font::FontRef;
use crate::text::shaping::{GlyphRun, ShapedGlyph, TextAlign, TextBlob};

/// OpenType feature switches, e.g. `[("liga", false)]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Features(pub Vec<(String, bool)>);

/// Variable font axis values, e.g. `[("wght", 700.0)]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variations(pub Vec<(String, f64)>);

impl<S: Into<String>, const N: usize> From<[(S, bool); N]> for Features {
    fn from(items: [(S, bool); N]) -> Self {
        Features(items.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<S: Into<String>> From<Vec<(S, bool)>> for Features {
    fn from(items: Vec<(S, bool)>) -> Self {
        Features(items.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[(S, f64); N]> for Variations {
    fn from(items: [(S, f64); N]) -> Self {
        Variations(items.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<S: Into<String>> From<Vec<(S, f64)>> for Variations {
    fn from(items: Vec<(S, f64)>) -> Self {
        Variations(items.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Text attributes of a graphics state.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    font: Option<FontRef>,
    font_size: f64,
    features: BTreeMap<String, bool>,
    variations: BTreeMap<String, f64>,
    language: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        TextStyle {
            font: None,
            font_size: 10.0,
            features: BTreeMap::new(),
            variations: BTreeMap::new(),
            language: None,
        }
    }
}

impl TextStyle {
    pub fn font(&self) -> Option<&FontRef> {
        self.font.as_ref()
    }

    pub fn set_font(&mut self, font: FontRef) {
        self.font = Some(font);
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    pub fn set_font_size(&mut self, size: f64) {
        self.font_size = size;
    }

    pub fn features(&self) -> &BTreeMap<String, bool> {
        &self.features
    }

    pub fn update_features(&mut self, features: Features) {
        self.features.extend(features.0);
    }

    pub fn reset_features(&mut self) {
        self.features.clear();
    }

    pub fn variations(&self) -> &BTreeMap<String, f64> {
        &self.variations
    }

    pub fn update_variations(&mut self, variations: Variations) {
        self.variations.extend(variations.0);
    }

    pub fn reset_variations(&mut self) {
        self.variations.clear();
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn set_language(&mut self, language: Option<String>) {
        self.language = language;
    }

    fn resolved_font(&self) -> Option<FontRef> {
        self.font.clone().or_else(FontRef::default_font)
    }

    fn rb_variations(&self) -> Vec<Variation> {
        self.variations
            .iter()
            .map(|(tag, value)| Variation {
                tag: Tag::from_bytes_lossy(tag.as_bytes()),
                value: *value as f32,
            })
            .collect()
    }

    /// Shapes `text` with the current font, or the system default font.
    /// `None` when there is no font to shape with.
    pub fn shape(&self, text: &str) -> Result<Option<GlyphRun>> {
        let Some(font) = self.resolved_font() else {
            return Ok(None);
        };
        let mut face = font.face()?;
        let variations = self.rb_variations();
        if !variations.is_empty() {
            face.set_variations(&variations);
        }

        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(text);
        if let Some(language) = &self.language {
            match Language::from_str(language) {
                Ok(language) => buffer.set_language(language),
                Err(e) => debug!("Ignoring language tag {:?}: {}", language, e),
            }
        }
        buffer.guess_segment_properties();

        let features: Vec<Feature> = self
            .features
            .iter()
            .map(|(tag, on)| Feature::new(Tag::from_bytes_lossy(tag.as_bytes()), *on as u32, ..))
            .collect();
        let shaped = rustybuzz::shape(&face, &features, buffer);

        let metrics: &ttf_parser::Face = face.as_ref();
        let scale = self.font_size / metrics.units_per_em() as f64;
        let line_spacing = (metrics.ascender() as f64 - metrics.descender() as f64
            + metrics.line_gap() as f64)
            * scale;

        let mut glyphs = Vec::with_capacity(shaped.len());
        let (mut pen_x, mut pen_y) = (0.0, 0.0);
        for (info, pos) in shaped.glyph_infos().iter().zip(shaped.glyph_positions()) {
            glyphs.push(ShapedGlyph {
                id: info.glyph_id as u16,
                cluster: info.cluster,
                x: pen_x + pos.x_offset as f64 * scale,
                y: pen_y + pos.y_offset as f64 * scale,
            });
            pen_x += pos.x_advance as f64 * scale;
            pen_y += pos.y_advance as f64 * scale;
        }

        Ok(Some(GlyphRun::new(
            font,
            self.font_size,
            variations,
            glyphs,
            (pen_x, pen_y),
            line_spacing,
        )))
    }

    pub fn make_text_blob(&self, run: &GlyphRun, align: Option<TextAlign>) -> Result<TextBlob> {
        TextBlob::from_run(run, align.unwrap_or_default())
    }
}

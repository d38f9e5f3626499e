use std::collections::BTreeMap;

use crate::color::ColorArgs;
use crate::error::Result;
use crate::state::paint::{BlendMode, LineCap, LineJoin, Paint};
use crate::text::{Features, FontRef, TextStyle, Variations};

/// The attributes every drawing call reads: two paints and the text style.
///
/// `Clone` is derived for inspection. Snapshots taken for a saved state go
/// through [`GraphicsState::copy`].
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsState {
    fill_paint: Paint,
    stroke_paint: Paint,
    text_style: TextStyle,
}

impl Default for GraphicsState {
    fn default() -> Self {
        GraphicsState {
            fill_paint: Paint::new_fill(),
            stroke_paint: Paint::new_stroke(),
            text_style: TextStyle::default(),
        }
    }
}

impl GraphicsState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Independent copy, both paints copied field by field.
    pub fn copy(&self) -> GraphicsState {
        GraphicsState {
            fill_paint: self.fill_paint.copy(),
            stroke_paint: self.stroke_paint.copy(),
            text_style: self.text_style.clone(),
        }
    }

    pub fn fill_paint(&self) -> &Paint {
        &self.fill_paint
    }

    pub fn stroke_paint(&self) -> &Paint {
        &self.stroke_paint
    }

    pub fn text_style(&self) -> &TextStyle {
        &self.text_style
    }

    pub fn fill_enabled(&self) -> bool {
        self.fill_paint.is_enabled()
    }

    pub fn stroke_enabled(&self) -> bool {
        self.stroke_paint.is_enabled()
    }

    pub fn fill(&mut self, color: ColorArgs) {
        self.fill_paint.set_color(color.to_argb());
    }

    pub fn stroke(&mut self, color: ColorArgs) {
        self.stroke_paint.set_color(color.to_argb());
    }

    pub fn blend_mode(&mut self, mode: BlendMode) {
        self.fill_paint.set_blend_mode(mode);
        self.stroke_paint.set_blend_mode(mode);
    }

    pub fn stroke_width(&mut self, width: f64) {
        self.stroke_paint.set_stroke_width(width);
    }

    pub fn line_cap(&mut self, cap: LineCap) {
        self.stroke_paint.set_line_cap(cap);
    }

    pub fn line_join(&mut self, join: LineJoin) {
        self.stroke_paint.set_line_join(join);
    }

    /// An empty pattern draws solid lines.
    pub fn line_dash(&mut self, dash: Vec<f64>) {
        self.stroke_paint.set_dash(dash);
    }

    pub fn miter_limit(&mut self, limit: f64) {
        self.stroke_paint.set_miter_limit(limit);
    }

    /// Selects a font by file path or by system font name and returns the
    /// name it was registered under. The previous font stays on failure.
    pub fn font(&mut self, name_or_path: String) -> Result<String> {
        let font = FontRef::load(&name_or_path)?;
        let name = font.name().to_string();
        self.text_style.set_font(font);
        Ok(name)
    }

    pub fn font_size(&mut self, size: f64) {
        self.text_style.set_font_size(size);
    }

    /// Merges `features` into the active set and returns the result.
    pub fn open_type_features(&mut self, features: Features) -> BTreeMap<String, bool> {
        self.text_style.update_features(features);
        self.text_style.features().clone()
    }

    pub fn reset_open_type_features(&mut self) {
        self.text_style.reset_features();
    }

    /// Merges axis values into the active set and returns the result.
    pub fn font_variations(&mut self, variations: Variations) -> BTreeMap<String, f64> {
        self.text_style.update_variations(variations);
        self.text_style.variations().clone()
    }

    pub fn reset_font_variations(&mut self) {
        self.text_style.reset_variations();
    }

    pub fn language(&mut self, language: Option<String>) {
        self.text_style.set_language(language);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Argb;

    #[test]
    fn test_defaults() {
        let state = GraphicsState::new();
        assert!(state.fill_enabled());
        assert!(!state.stroke_enabled());
        assert_eq!(state.fill_paint().argb(), Argb::BLACK);
        assert_eq!(state.stroke_paint().stroke_width(), 1.0);
        assert_eq!(state.text_style().font_size(), 10.0);
    }

    #[test]
    fn test_copy_is_independent() {
        let mut parent = GraphicsState::new();
        parent.line_dash(vec![4.0, 2.0]);
        let mut child = parent.copy();
        assert_eq!(child, parent);

        child.fill(ColorArgs::from((1.0, 0.0, 0.0)));
        child.stroke_width(7.0);
        child.line_dash(vec![1.0]);
        assert_eq!(parent.fill_paint().color(), (255, 0, 0, 0));
        assert_eq!(parent.stroke_paint().stroke_width(), 1.0);
        assert_eq!(parent.stroke_paint().dash(), &[4.0, 2.0]);
    }

    #[test]
    fn test_disable_keeps_attributes() {
        let mut state = GraphicsState::new();
        state.stroke(ColorArgs::from(0.5));
        state.stroke_width(3.0);
        state.stroke(ColorArgs::none());
        assert!(!state.stroke_enabled());
        state.stroke(ColorArgs::from(1.0));
        assert!(state.stroke_enabled());
        assert_eq!(state.stroke_paint().stroke_width(), 3.0);
        assert_eq!(state.stroke_paint().color(), (255, 255, 255, 255));
    }

    #[test]
    fn test_blend_mode_sets_both_paints() {
        let mut state = GraphicsState::new();
        state.blend_mode(BlendMode::Multiply);
        assert_eq!(state.fill_paint().blend_mode(), BlendMode::Multiply);
        assert_eq!(state.stroke_paint().blend_mode(), BlendMode::Multiply);
    }

    #[test]
    fn test_features_merge_and_reset() {
        let mut state = GraphicsState::new();
        state.open_type_features(Features::from([("liga", false)]));
        let active = state.open_type_features(Features::from([("smcp", true)]));
        assert_eq!(active.len(), 2);
        assert_eq!(active.get("liga"), Some(&false));
        state.reset_open_type_features();
        assert!(state.text_style().features().is_empty());

        let axes = state.font_variations(Variations::from([("wght", 600.0)]));
        assert_eq!(axes.get("wght"), Some(&600.0));
        state.reset_font_variations();
        assert!(state.text_style().variations().is_empty());
    }

    #[test]
    fn test_unknown_font_keeps_previous() {
        let mut state = GraphicsState::new();
        assert!(state.font("no-such-font-for-sure-1234".to_string()).is_err());
        assert!(state.text_style().font().is_none());
    }
}

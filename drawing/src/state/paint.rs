use strum::{AsRefStr, Display, EnumString};

use crate::color::Argb;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaintStyle {
    #[default]
    Fill,
    Stroke,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    SoftLight,
    HardLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
    Clear,
    Copy,
    SourceIn,
    SourceOut,
    SourceAtop,
    DestinationOver,
    DestinationIn,
    DestinationOut,
    DestinationAtop,
    #[strum(serialize = "xOR")]
    Xor,
    PlusLighter,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// One fill or stroke record of a graphics state.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    enabled: bool,
    color: Argb,
    style: PaintStyle,
    stroke_width: f64,
    line_cap: LineCap,
    line_join: LineJoin,
    miter_limit: f64,
    dash: Vec<f64>,
    blend_mode: BlendMode,
    anti_alias: bool,
}

impl Paint {
    fn new(style: PaintStyle, enabled: bool, stroke_width: f64) -> Self {
        Paint {
            enabled,
            color: Argb::BLACK,
            style,
            stroke_width,
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
            miter_limit: 4.0,
            dash: Vec::new(),
            blend_mode: BlendMode::default(),
            anti_alias: true,
        }
    }

    /// Enabled black fill.
    pub fn new_fill() -> Self {
        Paint::new(PaintStyle::Fill, true, 0.0)
    }

    /// Disabled black stroke, one unit wide.
    pub fn new_stroke() -> Self {
        Paint::new(PaintStyle::Stroke, false, 1.0)
    }

    /// Field-by-field copy; the dash pattern gets its own buffer.
    pub fn copy(&self) -> Paint {
        Paint {
            enabled: self.enabled,
            color: self.color,
            style: self.style,
            stroke_width: self.stroke_width,
            line_cap: self.line_cap,
            line_join: self.line_join,
            miter_limit: self.miter_limit,
            dash: self.dash.to_vec(),
            blend_mode: self.blend_mode,
            anti_alias: self.anti_alias,
        }
    }

    /// `None` disables the paint and keeps every other attribute.
    pub fn set_color(&mut self, color: Option<Argb>) {
        match color {
            Some(color) => {
                self.enabled = true;
                self.color = color;
            }
            None => self.enabled = false,
        }
    }

    /// `(alpha, red, green, blue)`
    pub fn color(&self) -> (u8, u8, u8, u8) {
        self.color.tuple()
    }

    pub fn argb(&self) -> Argb {
        self.color
    }

    pub fn something_to_draw(&self) -> bool {
        self.enabled && self.color.a > 0
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn style(&self) -> PaintStyle {
        self.style
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        self.stroke_width = width;
    }

    pub fn line_cap(&self) -> LineCap {
        self.line_cap
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.line_cap = cap;
    }

    pub fn line_join(&self) -> LineJoin {
        self.line_join
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.line_join = join;
    }

    pub fn miter_limit(&self) -> f64 {
        self.miter_limit
    }

    pub fn set_miter_limit(&mut self, limit: f64) {
        self.miter_limit = limit;
    }

    /// Empty means a solid line.
    pub fn dash(&self) -> &[f64] {
        &self.dash
    }

    pub fn set_dash(&mut self, dash: Vec<f64>) {
        self.dash = dash;
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend_mode = mode;
    }

    pub fn anti_alias(&self) -> bool {
        self.anti_alias
    }
}

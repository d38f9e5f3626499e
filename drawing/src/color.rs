/// An 8-bit-per-channel color. Channels are always in `[0, 255]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Argb {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Argb {
    pub const BLACK: Argb = Argb::new(255, 0, 0, 0);
    pub const WHITE: Argb = Argb::new(255, 255, 255, 255);

    pub const fn new(a: u8, r: u8, g: u8, b: u8) -> Self {
        Argb { a, r, g, b }
    }

    /// Builds a color from unit floats, rounding half up and clamping each channel.
    pub fn from_unit(a: f64, r: f64, g: f64, b: f64) -> Self {
        Argb {
            a: unit_to_channel(a),
            r: unit_to_channel(r),
            g: unit_to_channel(g),
            b: unit_to_channel(b),
        }
    }

    /// `(alpha, red, green, blue)`
    pub fn tuple(&self) -> (u8, u8, u8, u8) {
        (self.a, self.r, self.g, self.b)
    }

    /// `(red, green, blue, alpha)` as unit floats.
    pub fn to_rgba_f64(&self) -> (f64, f64, f64, f64) {
        (
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
            self.a as f64 / 255.0,
        )
    }
}

impl Default for Argb {
    fn default() -> Self {
        Argb::BLACK
    }
}

fn unit_to_channel(v: f64) -> u8 {
    // NaN falls through the clamp and saturates to 0 on the cast
    (v * 255.0 + 0.5).floor().clamp(0.0, 255.0) as u8
}

/// Normalizes fill/stroke color arguments.
///
/// * no component disables the channel (`None`)
/// * `[gray]`, `[gray, alpha]`, `[r, g, b]`, `[r, g, b, alpha]`
///
/// # Panics
/// More than four components is a calling mistake and aborts.
pub fn color_args(args: &[f64]) -> Option<Argb> {
    let (r, g, b, alpha) = match *args {
        [] => return None,
        [gray] => (gray, gray, gray, 1.0),
        [gray, alpha] => (gray, gray, gray, alpha),
        [r, g, b] => (r, g, b, 1.0),
        [r, g, b, alpha] => (r, g, b, alpha),
        _ => panic!(
            "a color takes between 0 and 4 components, got {}",
            args.len()
        ),
    };
    Some(Argb::from_unit(alpha, r, g, b))
}

/// Color arguments as accepted by `fill` and `stroke`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorArgs(Vec<f64>);

impl ColorArgs {
    /// Disables the channel.
    pub fn none() -> Self {
        ColorArgs(Vec::new())
    }

    pub fn components(&self) -> &[f64] {
        &self.0
    }

    pub fn to_argb(&self) -> Option<Argb> {
        color_args(&self.0)
    }
}

impl From<()> for ColorArgs {
    fn from(_: ()) -> Self {
        ColorArgs::none()
    }
}

impl From<f64> for ColorArgs {
    fn from(gray: f64) -> Self {
        ColorArgs(vec![gray])
    }
}

impl<T: Into<ColorArgs>> From<Option<T>> for ColorArgs {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(ColorArgs::none, Into::into)
    }
}

impl From<(f64, f64)> for ColorArgs {
    fn from((gray, alpha): (f64, f64)) -> Self {
        ColorArgs(vec![gray, alpha])
    }
}

impl From<(f64, f64, f64)> for ColorArgs {
    fn from((r, g, b): (f64, f64, f64)) -> Self {
        ColorArgs(vec![r, g, b])
    }
}

impl From<(f64, f64, f64, f64)> for ColorArgs {
    fn from((r, g, b, a): (f64, f64, f64, f64)) -> Self {
        ColorArgs(vec![r, g, b, a])
    }
}

impl<const N: usize> From<[f64; N]> for ColorArgs {
    fn from(components: [f64; N]) -> Self {
        ColorArgs(components.to_vec())
    }
}

impl From<&[f64]> for ColorArgs {
    fn from(components: &[f64]) -> Self {
        ColorArgs(components.to_vec())
    }
}

impl From<Vec<f64>> for ColorArgs {
    fn from(components: Vec<f64>) -> Self {
        ColorArgs(components)
    }
}

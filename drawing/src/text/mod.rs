mod font;
mod shaping;
mod style;

pub use font::FontRef;
pub use shaping::{GlyphRun, ShapedGlyph, TextAlign, TextBlob};
pub use style::{Features, TextStyle, Variations};

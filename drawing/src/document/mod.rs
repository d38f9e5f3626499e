use std::path::Path;

use crate::canvas::Canvas;
use crate::error::Result;

pub mod format;
pub mod trace;

pub use format::{indexed_paths, OutputFormat, RasterFormat};
pub use trace::TraceDocument;

/// Seconds each page stays on screen in video output unless changed.
pub const DEFAULT_FRAME_DURATION: f64 = 0.1;

/// Encoding options of [`Document::save_image`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveOptions {
    codec: Option<String>,
}

impl SaveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Video codec passed to the encoder, e.g. `mpeg4`.
    pub fn codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = Some(codec.into());
        self
    }

    pub fn codec_name(&self) -> Option<&str> {
        self.codec.as_deref()
    }
}

/// Page accumulation and final encoding.
///
/// A document hands out one canvas per page. The canvas is returned to the
/// document implicitly: `end_page` finalizes whatever was drawn on the
/// canvas of the open page.
pub trait Document {
    /// A page is open.
    fn is_drawing(&self) -> bool;

    /// Width of the open page, or of the last one.
    fn page_width(&self) -> Option<f64>;

    fn page_height(&self) -> Option<f64>;

    /// Number of finished pages.
    fn page_count(&self) -> usize;

    fn begin_page(&mut self, width: f64, height: f64) -> Result<Box<dyn Canvas>>;

    fn end_page(&mut self) -> Result<()>;

    fn set_frame_duration(&mut self, seconds: f64);

    /// Writes every finished page to `path`, the output kind follows the
    /// file extension.
    fn save_image(&mut self, path: &Path, options: &SaveOptions) -> Result<()>;
}

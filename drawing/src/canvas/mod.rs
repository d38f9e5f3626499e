use image::RgbaImage;

use crate::error::Result;
use crate::geom::coordinate::{Matrix, Point};
use crate::geom::path::BezierPath;
use crate::geom::rect::Rect;
use crate::state::paint::{BlendMode, Paint};
use crate::text::TextBlob;

pub mod proxy;
pub mod trace;

pub use proxy::CanvasProxy;
pub use trace::{TraceCanvas, TraceLog};

/// How an image is composited onto the page.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImagePaint {
    /// `None` draws the image opaque.
    pub alpha: Option<u8>,
    /// `None` uses the engine's normal compositing.
    pub blend_mode: Option<BlendMode>,
}

/// The native drawing surface of one page.
///
/// Transform calls concatenate onto the current matrix. `save`/`restore`
/// bracket the matrix and the clip.
pub trait Canvas {
    fn save(&mut self) -> Result<()>;

    fn restore(&mut self) -> Result<()>;

    fn translate(&mut self, dx: f64, dy: f64) -> Result<()>;

    fn scale(&mut self, sx: f64, sy: f64) -> Result<()>;

    /// Angle in degrees.
    fn rotate(&mut self, degrees: f64) -> Result<()>;

    /// Shear factors, the x coordinate grows by `kx * y`.
    fn skew(&mut self, kx: f64, ky: f64) -> Result<()>;

    fn concat(&mut self, matrix: &Matrix) -> Result<()>;

    fn draw_rect(&mut self, rect: &Rect, paint: &Paint) -> Result<()>;

    fn draw_oval(&mut self, rect: &Rect, paint: &Paint) -> Result<()> {
        let mut path = BezierPath::new();
        path.oval(rect.lx(), rect.ly(), rect.width(), rect.height());
        self.draw_path(&path, paint)
    }

    fn draw_line(&mut self, from: Point, to: Point, paint: &Paint) -> Result<()>;

    fn draw_path(&mut self, path: &BezierPath, paint: &Paint) -> Result<()>;

    fn clip_path(&mut self, path: &BezierPath) -> Result<()>;

    fn draw_text_blob(&mut self, blob: &TextBlob, paint: &Paint) -> Result<()> {
        self.draw_path(blob.path(), paint)
    }

    /// Draws `image` with its top left corner at `(x, y)`, one pixel per unit.
    fn draw_image(&mut self, image: &RgbaImage, x: f64, y: f64, paint: &ImagePaint)
        -> Result<()>;
}

use cairo::{Antialias, Context, Format, ImageSurface, Operator};
use drawing::canvas::{Canvas, ImagePaint};
use drawing::error::{DrawError, Result};
use drawing::geom::coordinate::{Matrix, Point};
use drawing::geom::path::BezierPath;
use drawing::geom::rect::Rect;
use drawing::geom::sub_path::PathSegment;
use drawing::state::{BlendMode, LineCap, LineJoin, Paint, PaintStyle};
use image::RgbaImage;
use log::warn;

/// A [`Canvas`] drawing on a cairo context.
pub struct CairoCanvas {
    context: Context,
    depth: usize,
}

impl CairoCanvas {
    pub fn new(context: Context) -> Self {
        CairoCanvas { context, depth: 0 }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    fn replay_path(&self, path: &BezierPath) {
        self.context.new_path();
        for seg in path.segments() {
            match seg {
                PathSegment::MoveTo(p) => self.context.move_to(p.x(), p.y()),
                PathSegment::LineTo(p) => self.context.line_to(p.x(), p.y()),
                PathSegment::CurveTo(c1, c2, p) => {
                    self.context
                        .curve_to(c1.x(), c1.y(), c2.x(), c2.y(), p.x(), p.y());
                }
                PathSegment::Closed => self.context.close_path(),
            }
        }
    }

    fn apply_paint(&self, paint: &Paint) -> Result<()> {
        let (r, g, b, a) = paint.argb().to_rgba_f64();
        self.context.set_source_rgba(r, g, b, a);
        self.context.set_operator(operator(paint.blend_mode()));
        self.context.set_antialias(if paint.anti_alias() {
            Antialias::Default
        } else {
            Antialias::None
        });
        if paint.style() == PaintStyle::Stroke {
            self.apply_stroke(paint, paint.stroke_width())?;
        }
        Ok(())
    }

    fn apply_stroke(&self, paint: &Paint, width: f64) -> Result<()> {
        let width = if width > 0.0 { width } else { self.hairline()? };
        self.context.set_line_width(width);
        self.context.set_line_cap(match paint.line_cap() {
            LineCap::Butt => cairo::LineCap::Butt,
            LineCap::Round => cairo::LineCap::Round,
            LineCap::Square => cairo::LineCap::Square,
        });
        self.context.set_line_join(match paint.line_join() {
            LineJoin::Miter => cairo::LineJoin::Miter,
            LineJoin::Round => cairo::LineJoin::Round,
            LineJoin::Bevel => cairo::LineJoin::Bevel,
        });
        self.context.set_miter_limit(paint.miter_limit());
        self.context.set_dash(paint.dash(), 0.0);
        Ok(())
    }

    // one device pixel in user space
    fn hairline(&self) -> Result<f64> {
        let (dx, dy) = self
            .context
            .device_to_user_distance(1.0, 0.0)
            .map_err(DrawError::native)?;
        Ok(dx.hypot(dy))
    }

    fn paint_current_path(&self, paint: &Paint) -> Result<()> {
        self.apply_paint(paint)?;
        match paint.style() {
            PaintStyle::Fill => self.context.fill(),
            PaintStyle::Stroke => self.context.stroke(),
        }
        .map_err(DrawError::native)
    }
}

pub(crate) fn operator(mode: BlendMode) -> Operator {
    match mode {
        BlendMode::Normal => Operator::Over,
        BlendMode::Multiply => Operator::Multiply,
        BlendMode::Screen => Operator::Screen,
        BlendMode::Overlay => Operator::Overlay,
        BlendMode::Darken => Operator::Darken,
        BlendMode::Lighten => Operator::Lighten,
        BlendMode::ColorDodge => Operator::ColorDodge,
        BlendMode::ColorBurn => Operator::ColorBurn,
        BlendMode::SoftLight => Operator::SoftLight,
        BlendMode::HardLight => Operator::HardLight,
        BlendMode::Difference => Operator::Difference,
        BlendMode::Exclusion => Operator::Exclusion,
        BlendMode::Hue => Operator::HslHue,
        BlendMode::Saturation => Operator::HslSaturation,
        BlendMode::Color => Operator::HslColor,
        BlendMode::Luminosity => Operator::HslLuminosity,
        BlendMode::Clear => Operator::Clear,
        BlendMode::Copy => Operator::Source,
        BlendMode::SourceIn => Operator::In,
        BlendMode::SourceOut => Operator::Out,
        BlendMode::SourceAtop => Operator::Atop,
        BlendMode::DestinationOver => Operator::DestOver,
        BlendMode::DestinationIn => Operator::DestIn,
        BlendMode::DestinationOut => Operator::DestOut,
        BlendMode::DestinationAtop => Operator::DestAtop,
        BlendMode::Xor => Operator::Xor,
        BlendMode::PlusLighter => Operator::Add,
    }
}

/// Premultiplied native-endian ARGB32 surface holding `image`.
fn image_surface(image: &RgbaImage) -> Result<ImageSurface> {
    let (width, height) = image.dimensions();
    let stride = Format::ARgb32
        .stride_for_width(width)
        .map_err(DrawError::native)?;
    let mut data = vec![0u8; stride as usize * height as usize];
    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let premultiply = |c: u8| (c as u32 * a as u32 + 127) / 255;
        let argb = (a as u32) << 24 | premultiply(r) << 16 | premultiply(g) << 8 | premultiply(b);
        let offset = y as usize * stride as usize + x as usize * 4;
        data[offset..offset + 4].copy_from_slice(&argb.to_ne_bytes());
    }
    ImageSurface::create_for_data(data, Format::ARgb32, width as i32, height as i32, stride)
        .map_err(DrawError::native)
}

impl Canvas for CairoCanvas {
    fn save(&mut self) -> Result<()> {
        self.context.save().map_err(DrawError::native)?;
        self.depth += 1;
        Ok(())
    }

    fn restore(&mut self) -> Result<()> {
        if self.depth == 0 {
            warn!("Unbalanced canvas restore ignored");
            return Ok(());
        }
        self.context.restore().map_err(DrawError::native)?;
        self.depth -= 1;
        Ok(())
    }

    fn translate(&mut self, dx: f64, dy: f64) -> Result<()> {
        self.context.translate(dx, dy);
        Ok(())
    }

    fn scale(&mut self, sx: f64, sy: f64) -> Result<()> {
        self.context.scale(sx, sy);
        Ok(())
    }

    fn rotate(&mut self, degrees: f64) -> Result<()> {
        self.context.rotate(degrees.to_radians());
        Ok(())
    }

    fn skew(&mut self, kx: f64, ky: f64) -> Result<()> {
        self.concat(&Matrix::new_skew_matrix(kx, ky))
    }

    fn concat(&mut self, matrix: &Matrix) -> Result<()> {
        self.context.transform(cairo::Matrix::new(
            matrix.a, matrix.b, matrix.c, matrix.d, matrix.e, matrix.f,
        ));
        Ok(())
    }

    fn draw_rect(&mut self, rect: &Rect, paint: &Paint) -> Result<()> {
        self.context.new_path();
        self.context
            .rectangle(rect.lx(), rect.ly(), rect.width(), rect.height());
        self.paint_current_path(paint)
    }

    fn draw_line(&mut self, from: Point, to: Point, paint: &Paint) -> Result<()> {
        // lines are stroked whatever the paint style
        self.apply_paint(paint)?;
        self.apply_stroke(paint, paint.stroke_width())?;
        self.context.new_path();
        self.context.move_to(from.x(), from.y());
        self.context.line_to(to.x(), to.y());
        self.context.stroke().map_err(DrawError::native)
    }

    fn draw_path(&mut self, path: &BezierPath, paint: &Paint) -> Result<()> {
        self.replay_path(path);
        self.paint_current_path(paint)
    }

    fn clip_path(&mut self, path: &BezierPath) -> Result<()> {
        self.replay_path(path);
        self.context.set_antialias(Antialias::Default);
        self.context.clip();
        Ok(())
    }

    fn draw_image(&mut self, image: &RgbaImage, x: f64, y: f64, paint: &ImagePaint) -> Result<()> {
        if image.width() == 0 || image.height() == 0 {
            return Ok(());
        }
        let surface = image_surface(image)?;
        self.context
            .set_operator(operator(paint.blend_mode.unwrap_or_default()));
        self.context
            .set_source_surface(&surface, x, y)
            .map_err(DrawError::native)?;
        match paint.alpha {
            Some(alpha) => self.context.paint_with_alpha(alpha as f64 / 255.0),
            None => self.context.paint(),
        }
        .map_err(DrawError::native)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawing::color::Argb;

    fn canvas(w: i32, h: i32) -> (CairoCanvas, ImageSurface) {
        let surface = ImageSurface::create(Format::ARgb32, w, h).unwrap();
        let context = Context::new(&surface).unwrap();
        (CairoCanvas::new(context), surface)
    }

    fn pixel(surface: &mut ImageSurface, x: usize, y: usize) -> u32 {
        surface.flush();
        let stride = surface.stride() as usize;
        let data = surface.data().unwrap();
        let o = y * stride + x * 4;
        u32::from_ne_bytes([data[o], data[o + 1], data[o + 2], data[o + 3]])
    }

    #[test]
    fn test_fill_rect() {
        let (mut c, mut surface) = canvas(10, 10);
        let mut paint = Paint::new_fill();
        paint.set_color(Some(Argb::new(255, 255, 0, 0)));
        c.draw_rect(&Rect::new(0.0, 0.0, 5.0, 5.0), &paint).unwrap();
        drop(c);
        assert_eq!(pixel(&mut surface, 2, 2), 0xFFFF0000);
        assert_eq!(pixel(&mut surface, 7, 7), 0);
    }

    #[test]
    fn test_unbalanced_restore_is_ignored() {
        let (mut c, _surface) = canvas(4, 4);
        c.save().unwrap();
        c.restore().unwrap();
        c.restore().unwrap();
        assert_eq!(c.depth, 0);
    }

    #[test]
    fn test_image_premultiplied() {
        let (mut c, mut surface) = canvas(2, 2);
        let image = RgbaImage::from_pixel(2, 2, image::Rgba([255, 255, 255, 128]));
        c.draw_image(&image, 0.0, 0.0, &ImagePaint::default()).unwrap();
        drop(c);
        assert_eq!(pixel(&mut surface, 1, 1), 0x80808080);
    }
}

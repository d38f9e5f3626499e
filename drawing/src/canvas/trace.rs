use std::cell::RefCell;
use std::fmt::Write;
use std::rc::Rc;

use image::RgbaImage;

use crate::canvas::{Canvas, ImagePaint};
use crate::error::Result;
use crate::geom::coordinate::{Matrix, Point};
use crate::geom::path::BezierPath;
use crate::geom::rect::Rect;
use crate::geom::sub_path::PathSegment;
use crate::state::paint::{Paint, PaintStyle};

/// Shared list of recorded canvas calls.
pub type TraceLog = Rc<RefCell<Vec<String>>>;

/// A canvas that draws nothing and records one line per call.
#[derive(Debug, Default)]
pub struct TraceCanvas {
    log: TraceLog,
}

impl TraceCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(log: TraceLog) -> Self {
        TraceCanvas { log }
    }

    pub fn log(&self) -> TraceLog {
        self.log.clone()
    }

    fn record(&self, line: String) -> Result<()> {
        self.log.borrow_mut().push(line);
        Ok(())
    }
}

fn paint_desc(paint: &Paint) -> String {
    let c = paint.argb();
    let mut desc = match paint.style() {
        PaintStyle::Fill => "fill".to_string(),
        PaintStyle::Stroke => format!("stroke {}", paint.stroke_width()),
    };
    let _ = write!(desc, " #{:02X}{:02X}{:02X}{:02X}", c.a, c.r, c.g, c.b);
    if paint.blend_mode() != Default::default() {
        let _ = write!(desc, " {}", paint.blend_mode());
    }
    desc
}

fn path_desc(path: &BezierPath) -> String {
    let mut out = String::new();
    for segment in path.segments() {
        let _ = match segment {
            PathSegment::MoveTo(p) => write!(out, "M{} {} ", p.x(), p.y()),
            PathSegment::LineTo(p) => write!(out, "L{} {} ", p.x(), p.y()),
            PathSegment::CurveTo(c1, c2, p) => write!(
                out,
                "C{} {} {} {} {} {} ",
                c1.x(),
                c1.y(),
                c2.x(),
                c2.y(),
                p.x(),
                p.y()
            ),
            PathSegment::Closed => write!(out, "Z "),
        };
    }
    out.trim_end().to_string()
}

impl Canvas for TraceCanvas {
    fn save(&mut self) -> Result<()> {
        self.record("save".to_string())
    }

    fn restore(&mut self) -> Result<()> {
        self.record("restore".to_string())
    }

    fn translate(&mut self, dx: f64, dy: f64) -> Result<()> {
        self.record(format!("translate {} {}", dx, dy))
    }

    fn scale(&mut self, sx: f64, sy: f64) -> Result<()> {
        self.record(format!("scale {} {}", sx, sy))
    }

    fn rotate(&mut self, degrees: f64) -> Result<()> {
        self.record(format!("rotate {}", degrees))
    }

    fn skew(&mut self, kx: f64, ky: f64) -> Result<()> {
        self.record(format!("skew {} {}", kx, ky))
    }

    fn concat(&mut self, matrix: &Matrix) -> Result<()> {
        let [a, b, c, d, e, f] = matrix.to_affine();
        self.record(format!("concat {} {} {} {} {} {}", a, b, c, d, e, f))
    }

    fn draw_rect(&mut self, rect: &Rect, paint: &Paint) -> Result<()> {
        self.record(format!(
            "rect {} {} {} {} {}",
            rect.lx(),
            rect.ly(),
            rect.width(),
            rect.height(),
            paint_desc(paint)
        ))
    }

    fn draw_oval(&mut self, rect: &Rect, paint: &Paint) -> Result<()> {
        self.record(format!(
            "oval {} {} {} {} {}",
            rect.lx(),
            rect.ly(),
            rect.width(),
            rect.height(),
            paint_desc(paint)
        ))
    }

    fn draw_line(&mut self, from: Point, to: Point, paint: &Paint) -> Result<()> {
        self.record(format!(
            "line {} {} {} {} {}",
            from.x(),
            from.y(),
            to.x(),
            to.y(),
            paint_desc(paint)
        ))
    }

    fn draw_path(&mut self, path: &BezierPath, paint: &Paint) -> Result<()> {
        self.record(format!("path {} {}", path_desc(path), paint_desc(paint)))
    }

    fn clip_path(&mut self, path: &BezierPath) -> Result<()> {
        self.record(format!("clip {}", path_desc(path)))
    }

    fn draw_text_blob(&mut self, blob: &crate::text::TextBlob, paint: &Paint) -> Result<()> {
        self.record(format!("text {} {}", blob.glyph_count(), paint_desc(paint)))
    }

    fn draw_image(&mut self, image: &RgbaImage, x: f64, y: f64, paint: &ImagePaint) -> Result<()> {
        let mut line = format!("image {}x{} at {} {}", image.width(), image.height(), x, y);
        if let Some(alpha) = paint.alpha {
            let _ = write!(line, " alpha {}", alpha);
        }
        if let Some(mode) = paint.blend_mode {
            let _ = write!(line, " {}", mode);
        }
        self.record(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Argb;

    #[test]
    fn test_paint_lines() {
        let mut canvas = TraceCanvas::new();
        let mut stroke = Paint::new_stroke();
        stroke.set_color(Some(Argb::new(255, 255, 0, 0)));
        canvas
            .draw_rect(&Rect::new(1.0, 2.0, 3.0, 4.0), &Paint::new_fill())
            .unwrap();
        canvas
            .draw_line(Point::new(0.0, 0.0), Point::new(5.0, 5.0), &stroke)
            .unwrap();
        assert_eq!(
            *canvas.log().borrow(),
            vec!["rect 1 2 3 4 fill #FF000000", "line 0 0 5 5 stroke 1 #FFFF0000"]
        );
    }

    #[test]
    fn test_path_line() {
        let mut canvas = TraceCanvas::new();
        let mut path = BezierPath::new();
        path.polygon((0.0, 0.0), &[Point::new(0.0, 100.0), Point::new(100.0, 0.0)], true);
        canvas.clip_path(&path).unwrap();
        assert_eq!(*canvas.log().borrow(), vec!["clip M0 0 L0 100 L100 0 Z"]);
    }
}

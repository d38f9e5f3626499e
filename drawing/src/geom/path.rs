use crate::error::{DrawError, Result};
use crate::geom::coordinate::Point;
use crate::geom::rect::Rect;
use crate::geom::sub_path::{PathSegment, SubPath};

// Control point distance for a quarter circle drawn as one cubic.
const KAPPA: f64 = 0.552_284_749_830_793_4;

/// A bezier path made of sub paths. Opaque to the drawing layer, which only
/// hands it to the canvas.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BezierPath {
    current: Option<Point>,
    sub_paths: Vec<SubPath>,
}

impl BezierPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, point: impl Into<Point>) {
        let point = point.into();
        match self.sub_paths.last_mut() {
            Some(sub) if sub.is_single_move() => sub.set_start(point),
            _ => self.sub_paths.push(SubPath::new(point)),
        }
        self.current = Some(point);
    }

    pub fn line_to(&mut self, point: impl Into<Point>) -> Result<()> {
        let point = point.into();
        self.open_sub_path()?.line_to(point)?;
        self.current = Some(point);
        Ok(())
    }

    pub fn curve_to(
        &mut self,
        c1: impl Into<Point>,
        c2: impl Into<Point>,
        end: impl Into<Point>,
    ) -> Result<()> {
        let end = end.into();
        self.open_sub_path()?.curve_to(c1.into(), c2.into(), end)?;
        self.current = Some(end);
        Ok(())
    }

    /// Quadratic curve, stored as the equivalent cubic.
    pub fn qcurve_to(&mut self, control: impl Into<Point>, end: impl Into<Point>) -> Result<()> {
        let start = self.current_point().ok_or_else(|| {
            DrawError::Path("qcurve_to needs a current point".to_string())
        })?;
        let control = control.into();
        let end = end.into();
        let c1 = Point::new(
            start.x() + 2.0 / 3.0 * (control.x() - start.x()),
            start.y() + 2.0 / 3.0 * (control.y() - start.y()),
        );
        let c2 = Point::new(
            end.x() + 2.0 / 3.0 * (control.x() - end.x()),
            end.y() + 2.0 / 3.0 * (control.y() - end.y()),
        );
        self.curve_to(c1, c2, end)
    }

    pub fn close_path(&mut self) {
        if let Some(sub) = self.sub_paths.last_mut() {
            sub.close();
            self.current = sub.start_point().copied();
        }
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.move_to((x, y));
        self.push_line(Point::new(x + w, y));
        self.push_line(Point::new(x + w, y + h));
        self.push_line(Point::new(x, y + h));
        self.close_path();
    }

    pub fn oval(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let rx = w / 2.0;
        let ry = h / 2.0;
        let cx = x + rx;
        let cy = y + ry;
        let kx = rx * KAPPA;
        let ky = ry * KAPPA;
        self.move_to((cx + rx, cy));
        let quarters = [
            ((cx + rx, cy + ky), (cx + kx, cy + ry), (cx, cy + ry)),
            ((cx - kx, cy + ry), (cx - rx, cy + ky), (cx - rx, cy)),
            ((cx - rx, cy - ky), (cx - kx, cy - ry), (cx, cy - ry)),
            ((cx + kx, cy - ry), (cx + rx, cy - ky), (cx + rx, cy)),
        ];
        for (c1, c2, end) in quarters {
            if let Some(sub) = self.sub_paths.last_mut() {
                // the sub path was just opened by move_to
                let _ = sub.curve_to(c1.into(), c2.into(), end.into());
            }
        }
        self.close_path();
    }

    pub fn polygon(&mut self, first: impl Into<Point>, points: &[Point], close: bool) {
        self.move_to(first);
        for point in points {
            self.push_line(*point);
        }
        if close {
            self.close_path();
        }
    }

    pub fn current_point(&self) -> Option<Point> {
        self.current
    }

    pub fn sub_paths(&self) -> &[SubPath] {
        self.sub_paths.as_slice()
    }

    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.sub_paths.iter().flat_map(|sub| sub.segments().iter())
    }

    pub fn is_empty(&self) -> bool {
        self.sub_paths.is_empty()
    }

    /// Bounding box of all points, control points included.
    pub fn bounds(&self) -> Option<Rect> {
        let mut points = self.sub_paths.iter().flat_map(|sub| sub.points());
        let first = points.next()?;
        let (mut lx, mut ly, mut ux, mut uy) = (first.x(), first.y(), first.x(), first.y());
        for p in points {
            lx = lx.min(p.x());
            ly = ly.min(p.y());
            ux = ux.max(p.x());
            uy = uy.max(p.y());
        }
        Some(Rect::new(lx, ly, ux - lx, uy - ly))
    }

    // line_to for callers that just opened a sub path
    fn push_line(&mut self, point: Point) {
        if let Some(sub) = self.sub_paths.last_mut() {
            let _ = sub.line_to(point);
        }
        self.current = Some(point);
    }

    fn open_sub_path(&mut self) -> Result<&mut SubPath> {
        let current = self
            .current
            .ok_or_else(|| DrawError::Path("no current point, call move_to first".to_string()))?;
        let needs_new = self.sub_paths.last().map_or(true, SubPath::is_closed);
        if needs_new {
            self.sub_paths.push(SubPath::new(current));
        }
        self.sub_paths
            .last_mut()
            .ok_or_else(|| DrawError::Path("path has no sub path".to_string()))
    }
}

use crate::{
    error::{DrawError, Result},
    geom::coordinate::Point,
};

#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    /// Cubic curve: two control points then the end point.
    CurveTo(Point, Point, Point),
    Closed,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SubPath {
    segments: Vec<PathSegment>,
    is_closed: bool,
}

impl SubPath {
    pub fn new(point: Point) -> Self {
        SubPath {
            segments: vec![PathSegment::MoveTo(point)],
            is_closed: false,
        }
    }

    pub fn segments(&self) -> &[PathSegment] {
        self.segments.as_slice()
    }

    pub fn is_closed(&self) -> bool {
        self.is_closed
    }

    pub fn close(&mut self) {
        if self.is_closed || self.segments.len() <= 1 {
            return;
        }
        self.segments.push(PathSegment::Closed);
        self.is_closed = true;
    }

    pub fn set_start(&mut self, point: Point) {
        if self.is_single_move() {
            self.segments[0] = PathSegment::MoveTo(point);
        }
    }

    pub fn line_to(&mut self, point: Point) -> Result<()> {
        if self.segments.is_empty() {
            return Err(DrawError::Path(
                "Subpath lineto , subpath is empty".to_string(),
            ));
        }
        self.segments.push(PathSegment::LineTo(point));
        Ok(())
    }

    pub fn curve_to(&mut self, c1: Point, c2: Point, end: Point) -> Result<()> {
        if self.segments.is_empty() {
            return Err(DrawError::Path(
                "Subpath curveto , subpath is empty".to_string(),
            ));
        }
        self.segments.push(PathSegment::CurveTo(c1, c2, end));
        Ok(())
    }

    pub fn start_point(&self) -> Option<&Point> {
        match self.segments.first() {
            Some(PathSegment::MoveTo(p)) => Some(p),
            _ => None,
        }
    }

    /// Every point the sub path touches, control points included.
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.segments.iter().flat_map(|seg| match seg {
            PathSegment::MoveTo(p) | PathSegment::LineTo(p) => vec![p],
            PathSegment::CurveTo(c1, c2, p) => vec![c1, c2, p],
            PathSegment::Closed => Vec::new(),
        })
    }

    pub fn is_single_move(&self) -> bool {
        self.segments.len() == 1
    }
}

use crate::geom::coordinate::Point;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Rect {
    lf: Point,
    width: f64,
    height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            lf: Point::new(x, y),
            width,
            height,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn lx(&self) -> f64 {
        self.lf.x()
    }

    pub fn ly(&self) -> f64 {
        self.lf.y()
    }
}

use log::{debug, warn};

use crate::canvas::Canvas;
use crate::error::{DrawError, Result};
use crate::geom::coordinate::{Matrix, Point};

/// Owns the native canvas of the open page and applies the coordinate
/// convention and pivoted transforms on top of it.
pub struct CanvasProxy {
    native: Option<Box<dyn Canvas>>,
    flip: bool,
}

impl CanvasProxy {
    pub fn new(flip: bool) -> Self {
        CanvasProxy { native: None, flip }
    }

    /// Takes over the canvas of a freshly begun page. With flipping on, the
    /// origin moves to the bottom left and y grows upwards.
    pub fn install(&mut self, mut canvas: Box<dyn Canvas>, height: f64) -> Result<()> {
        if self.native.is_some() {
            warn!("Replacing a canvas that was not released");
        }
        if self.flip {
            canvas.translate(0.0, height)?;
            canvas.scale(1.0, -1.0)?;
        }
        debug!("Canvas installed, flip={} height={}", self.flip, height);
        self.native = Some(canvas);
        Ok(())
    }

    pub fn release(&mut self) -> Option<Box<dyn Canvas>> {
        self.native.take()
    }

    pub fn is_active(&self) -> bool {
        self.native.is_some()
    }

    pub fn flipped(&self) -> bool {
        self.flip
    }

    pub fn native(&mut self) -> Result<&mut dyn Canvas> {
        match self.native {
            Some(ref mut canvas) => Ok(canvas.as_mut()),
            None => Err(DrawError::NoCanvas),
        }
    }

    pub fn translate(&mut self, dx: f64, dy: f64) -> Result<()> {
        self.native()?.translate(dx, dy)
    }

    pub fn rotate(&mut self, degrees: f64, center: Point) -> Result<()> {
        self.pivoted(center, |canvas| canvas.rotate(degrees))
    }

    pub fn scale(&mut self, sx: f64, sy: f64, center: Point) -> Result<()> {
        self.pivoted(center, |canvas| canvas.scale(sx, sy))
    }

    /// Angles in degrees. The native call receives them in radians.
    pub fn skew(&mut self, degrees_x: f64, degrees_y: f64, center: Point) -> Result<()> {
        let (kx, ky) = (degrees_x.to_radians(), degrees_y.to_radians());
        self.pivoted(center, |canvas| canvas.skew(kx, ky))
    }

    pub fn transform(&mut self, matrix: &Matrix, center: Point) -> Result<()> {
        self.pivoted(center, |canvas| canvas.concat(matrix))
    }

    fn pivoted<F>(&mut self, center: Point, op: F) -> Result<()>
    where
        F: FnOnce(&mut dyn Canvas) -> Result<()>,
    {
        let canvas = self.native()?;
        if center.is_origin() {
            return op(canvas);
        }
        canvas.translate(center.x(), center.y())?;
        op(&mut *canvas)?;
        canvas.translate(-center.x(), -center.y())
    }
}

impl std::fmt::Debug for CanvasProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasProxy")
            .field("active", &self.is_active())
            .field("flip", &self.flip)
            .finish()
    }
}

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use log::{debug, error, info, warn};

use crate::canvas::{Canvas, CanvasProxy, ImagePaint};
use crate::color::ColorArgs;
use crate::delegate::Delegate;
use crate::document::{Document, SaveOptions};
use crate::error::{DrawError, Result};
use crate::geom::coordinate::{Matrix, Point};
use crate::geom::path::BezierPath;
use crate::geom::rect::Rect;
use crate::image_cache::{ImageCache, IMAGE_CACHE_SIZE};
use crate::state::{
    BlendMode, GraphicsState, LineCap, LineJoin, Paint, StateStack, UnwindPolicy,
};
use crate::text::{Features, TextAlign, Variations};

/// Behaviour switches of a [`Drawing`].
#[derive(Debug, Clone)]
pub struct DrawingConfig {
    /// Put the origin at the bottom left with y growing upwards.
    pub flip_canvas: bool,
    /// Page size used when drawing starts without `size` or `new_page`.
    pub default_page_size: (f64, f64),
    pub image_cache_capacity: usize,
    pub unwind: UnwindPolicy,
    /// Shared cache to use instead of a private one.
    pub image_cache: Option<Rc<ImageCache>>,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        DrawingConfig {
            flip_canvas: true,
            default_page_size: (1000.0, 1000.0),
            image_cache_capacity: IMAGE_CACHE_SIZE,
            unwind: UnwindPolicy::default(),
            image_cache: None,
        }
    }
}

pub(crate) struct DrawingCore {
    gstate: GraphicsState,
    stack: StateStack,
    canvas: CanvasProxy,
    document: Box<dyn Document>,
    images: Rc<ImageCache>,
    default_page_size: (f64, f64),
    unwind: UnwindPolicy,
}

impl DrawingCore {
    pub(crate) fn gstate_mut(&mut self) -> &mut GraphicsState {
        &mut self.gstate
    }

    fn ensure_page(&mut self) -> Result<()> {
        if !self.document.is_drawing() {
            let (width, height) = self.default_page_size;
            debug!("No page open, starting a {} x {} page", width, height);
            self.new_page(width, height)?;
        }
        Ok(())
    }

    fn new_page(&mut self, width: f64, height: f64) -> Result<()> {
        self.end_open_page()?;
        let canvas = self.document.begin_page(width, height)?;
        debug!("Page {} begins ({} x {})", self.document.page_count(), width, height);
        self.canvas.install(canvas, height)
    }

    fn end_open_page(&mut self) -> Result<()> {
        if self.document.is_drawing() {
            self.canvas.release();
            self.document.end_page()?;
            debug!("Page {} ended", self.document.page_count().saturating_sub(1));
        }
        Ok(())
    }

    fn push_state(&mut self) -> Result<()> {
        self.stack.push(&self.gstate);
        let saved = self
            .ensure_page()
            .and_then(|_| self.canvas.native()?.save());
        if saved.is_err() {
            self.stack.pop();
        }
        saved
    }

    fn pop_state(&mut self) -> Result<()> {
        let restored = match self.canvas.native() {
            Ok(canvas) => canvas.restore(),
            Err(_) => {
                debug!("No canvas to restore, only the graphics state is popped");
                Ok(())
            }
        };
        self.gstate = self
            .stack
            .pop()
            .ok_or_else(|| DrawError::Protocol("saved state stack is empty".to_string()))?;
        restored
    }

    /// Runs `draw` on the canvas of the open page, starting one if needed.
    fn with_canvas<R, F>(&mut self, draw: F) -> Result<R>
    where
        F: FnOnce(&mut dyn Canvas, &GraphicsState) -> Result<R>,
    {
        self.ensure_page()?;
        let canvas = self.canvas.native()?;
        draw(canvas, &self.gstate)
    }
}

/// Draws with the fill paint, then with the stroke paint, skipping a paint
/// that has nothing to draw.
fn draw_item<F>(canvas: &mut dyn Canvas, gstate: &GraphicsState, mut draw: F) -> Result<()>
where
    F: FnMut(&mut dyn Canvas, &Paint) -> Result<()>,
{
    if gstate.fill_paint().something_to_draw() {
        draw(&mut *canvas, gstate.fill_paint())?;
    }
    if gstate.stroke_paint().something_to_draw() {
        draw(&mut *canvas, gstate.stroke_paint())?;
    }
    Ok(())
}

/// Runs `body` between a canvas save and restore. The restore happens even
/// when `body` fails.
fn draw_isolated<F>(canvas: &mut dyn Canvas, body: F) -> Result<()>
where
    F: FnOnce(&mut dyn Canvas) -> Result<()>,
{
    canvas.save()?;
    let result = body(&mut *canvas);
    let restored = canvas.restore();
    result.and(restored)
}

/// Imperative drawing on an implicit current page.
///
/// Drawing calls read the current [`GraphicsState`] and go to the canvas of
/// the open page. The first call that needs a canvas opens a page of the
/// default size. Pages are accumulated by the [`Document`] and written out
/// by [`Drawing::save_image`].
pub struct Drawing {
    core: Rc<RefCell<DrawingCore>>,
}

impl Drawing {
    pub fn new(document: impl Document + 'static) -> Self {
        Drawing::with_document(Box::new(document))
    }

    pub fn with_document(document: Box<dyn Document>) -> Self {
        Drawing::with_config(document, DrawingConfig::default())
    }

    pub fn with_config(document: Box<dyn Document>, config: DrawingConfig) -> Self {
        let images = config
            .image_cache
            .unwrap_or_else(|| Rc::new(ImageCache::new(config.image_cache_capacity)));
        let core = DrawingCore {
            gstate: GraphicsState::new(),
            stack: StateStack::new(),
            canvas: CanvasProxy::new(config.flip_canvas),
            document,
            images,
            default_page_size: config.default_page_size,
            unwind: config.unwind,
        };
        Drawing {
            core: Rc::new(RefCell::new(core)),
        }
    }

    /// Opens the first page. Fails when a page is already open.
    pub fn size(&self, width: f64, height: f64) -> Result<()> {
        let mut core = self.core.borrow_mut();
        if core.document.is_drawing() {
            return Err(DrawError::Protocol(
                "size() can't be called if there's already a page active".to_string(),
            ));
        }
        core.new_page(width, height)
    }

    /// Ends the open page, if any, and opens a new one. The graphics state
    /// carries over.
    pub fn new_page(&self, width: f64, height: f64) -> Result<()> {
        self.core.borrow_mut().new_page(width, height)
    }

    /// Seconds the following pages last as video frames.
    pub fn frame_duration(&self, seconds: f64) {
        self.core.borrow_mut().document.set_frame_duration(seconds);
    }

    /// Width of the open or last page.
    pub fn width(&self) -> Option<f64> {
        self.core.borrow().document.page_width()
    }

    pub fn height(&self) -> Option<f64> {
        self.core.borrow().document.page_height()
    }

    pub fn rect(&self, x: f64, y: f64, w: f64, h: f64) -> Result<()> {
        let rect = Rect::new(x, y, w, h);
        self.core.borrow_mut().with_canvas(|canvas, gstate| {
            draw_item(canvas, gstate, |canvas, paint| canvas.draw_rect(&rect, paint))
        })
    }

    pub fn oval(&self, x: f64, y: f64, w: f64, h: f64) -> Result<()> {
        let rect = Rect::new(x, y, w, h);
        self.core.borrow_mut().with_canvas(|canvas, gstate| {
            draw_item(canvas, gstate, |canvas, paint| canvas.draw_oval(&rect, paint))
        })
    }

    pub fn line(&self, from: impl Into<Point>, to: impl Into<Point>) -> Result<()> {
        let (from, to) = (from.into(), to.into());
        self.core.borrow_mut().with_canvas(|canvas, gstate| {
            draw_item(canvas, gstate, |canvas, paint| canvas.draw_line(from, to, paint))
        })
    }

    pub fn polygon<P, I>(&self, first: impl Into<Point>, points: I, close: bool) -> Result<()>
    where
        P: Into<Point>,
        I: IntoIterator<Item = P>,
    {
        let points: Vec<Point> = points.into_iter().map(Into::into).collect();
        let mut path = BezierPath::new();
        path.polygon(first, &points, close);
        self.draw_path(&path)
    }

    pub fn draw_path(&self, path: &BezierPath) -> Result<()> {
        self.core.borrow_mut().with_canvas(|canvas, gstate| {
            draw_item(canvas, gstate, |canvas, paint| canvas.draw_path(path, paint))
        })
    }

    /// Intersects the clip of the open page with `path`.
    pub fn clip_path(&self, path: &BezierPath) -> Result<()> {
        self.core
            .borrow_mut()
            .with_canvas(|canvas, _| canvas.clip_path(path))
    }

    /// Binds `method` to whatever graphics state is current when called.
    pub fn delegate<A, R>(&self, method: fn(&mut GraphicsState, A) -> R) -> Delegate<A, R> {
        Delegate::new(self.core.clone(), method)
    }

    /// Selects a font and a size in one call.
    pub fn font_with_size(&self, name_or_path: impl Into<String>, size: f64) -> Result<String> {
        let name = self.font(name_or_path)?;
        self.font_size(size);
        Ok(name)
    }

    pub fn reset_open_type_features(&self) {
        self.core.borrow_mut().gstate.reset_open_type_features();
    }

    pub fn reset_font_variations(&self) {
        self.core.borrow_mut().gstate.reset_font_variations();
    }

    /// `(advance width, line spacing)` of `txt` in the current text style.
    pub fn text_size(&self, txt: &str) -> Result<(f64, f64)> {
        let core = self.core.borrow();
        let style = core.gstate.text_style();
        match style.shape(txt)? {
            Some(run) => Ok((run.end_pos().0, run.line_spacing())),
            None => {
                warn!("No font available, measuring {:?} as empty", txt);
                Ok((0.0, 1.2 * style.font_size()))
            }
        }
    }

    /// Draws `txt` with its baseline origin at `position`.
    pub fn text(&self, txt: &str, position: impl Into<Point>, align: Option<TextAlign>) -> Result<()> {
        if txt.is_empty() {
            return Ok(());
        }
        let position = position.into();
        let mut core = self.core.borrow_mut();
        let blob = {
            let style = core.gstate.text_style();
            let Some(run) = style.shape(txt)? else {
                warn!("No font available, {:?} is not drawn", txt);
                return Ok(());
            };
            style.make_text_blob(&run, align)?
        };
        let flip = core.canvas.flipped();
        core.with_canvas(|canvas, gstate| {
            draw_isolated(canvas, |canvas| {
                canvas.translate(position.x(), position.y())?;
                if flip {
                    canvas.scale(1.0, -1.0)?;
                }
                draw_item(canvas, gstate, |canvas, paint| canvas.draw_text_blob(&blob, paint))
            })
        })
    }

    /// Draws the image at `path` with its bottom left corner at `position`.
    /// `alpha` other than 1 makes it translucent. The blend mode of the fill
    /// paint applies when it is not normal.
    pub fn image(&self, path: impl AsRef<Path>, position: impl Into<Point>, alpha: f64) -> Result<()> {
        let position = position.into();
        let mut core = self.core.borrow_mut();
        let image = core.images.get(path.as_ref())?;
        let blend_mode = core.gstate.fill_paint().blend_mode();
        let paint = ImagePaint {
            alpha: (alpha != 1.0).then(|| (alpha * 255.0).round().clamp(0.0, 255.0) as u8),
            blend_mode: (blend_mode != BlendMode::Normal).then_some(blend_mode),
        };
        let flip = core.canvas.flipped();
        core.with_canvas(|canvas, _| {
            draw_isolated(canvas, |canvas| {
                canvas.translate(position.x(), position.y() + image.height() as f64)?;
                if flip {
                    canvas.scale(1.0, -1.0)?;
                }
                canvas.draw_image(&image, 0.0, 0.0, &paint)
            })
        })
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Result<()> {
        let mut core = self.core.borrow_mut();
        core.ensure_page()?;
        core.canvas.translate(dx, dy)
    }

    /// Rotates by `degrees` around `center`.
    pub fn rotate(&self, degrees: f64, center: impl Into<Point>) -> Result<()> {
        let mut core = self.core.borrow_mut();
        core.ensure_page()?;
        core.canvas.rotate(degrees, center.into())
    }

    pub fn scale(&self, sx: f64, sy: f64, center: impl Into<Point>) -> Result<()> {
        let mut core = self.core.borrow_mut();
        core.ensure_page()?;
        core.canvas.scale(sx, sy, center.into())
    }

    /// Skews by angles in degrees around `center`.
    pub fn skew(&self, degrees_x: f64, degrees_y: f64, center: impl Into<Point>) -> Result<()> {
        let mut core = self.core.borrow_mut();
        core.ensure_page()?;
        core.canvas.skew(degrees_x, degrees_y, center.into())
    }

    /// Concatenates the affine `[a, b, c, d, e, f]` around `center`.
    pub fn transform(&self, affine: [f64; 6], center: impl Into<Point>) -> Result<()> {
        let matrix = Matrix::from_affine(affine);
        let mut core = self.core.borrow_mut();
        core.ensure_page()?;
        core.canvas.transform(&matrix, center.into())
    }

    /// Saves the graphics state and the canvas state until the returned
    /// guard is restored or dropped.
    pub fn saved_state_guard(&self) -> Result<SavedState<'_>> {
        self.core.borrow_mut().push_state()?;
        Ok(SavedState {
            drawing: self,
            armed: true,
        })
    }

    /// Runs `body` in a saved state. State and canvas are restored when
    /// `body` returns. On error or panic they are restored under
    /// [`UnwindPolicy::Restore`] and left as they are under
    /// [`UnwindPolicy::Leave`].
    pub fn saved_state<R, F>(&self, body: F) -> Result<R>
    where
        F: FnOnce(&Drawing) -> Result<R>,
    {
        let guard = self.saved_state_guard()?;
        match body(self) {
            Ok(value) => {
                guard.restore()?;
                Ok(value)
            }
            Err(err) => {
                if self.core.borrow().unwind == UnwindPolicy::Leave {
                    guard.disarm();
                } else if let Err(restore_err) = guard.restore() {
                    warn!("Restoring after a failed block failed too: {}", restore_err);
                }
                Err(err)
            }
        }
    }

    /// Ends the open page and writes every page to `path`.
    pub fn save_image(&self, path: impl AsRef<Path>, options: &SaveOptions) -> Result<()> {
        let path = path.as_ref();
        let mut core = self.core.borrow_mut();
        core.end_open_page()?;
        info!("Saving {} page(s) to {}", core.document.page_count(), path.display());
        core.document.save_image(path, options)
    }

    /// Number of saved states not restored yet.
    pub fn state_depth(&self) -> usize {
        self.core.borrow().stack.depth()
    }

    /// A copy of the current graphics state.
    pub fn graphics_state(&self) -> GraphicsState {
        self.core.borrow().gstate.clone()
    }

    pub fn unwind_policy(&self) -> UnwindPolicy {
        self.core.borrow().unwind
    }

    pub fn image_cache(&self) -> Rc<ImageCache> {
        self.core.borrow().images.clone()
    }
}

impl std::fmt::Debug for Drawing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.core.try_borrow() {
            Ok(core) => f
                .debug_struct("Drawing")
                .field("gstate", &core.gstate)
                .field("depth", &core.stack.depth())
                .field("canvas", &core.canvas)
                .finish(),
            Err(_) => f.write_str("Drawing { <in use> }"),
        }
    }
}

macro_rules! gstate_delegates {
    ($($(#[$meta:meta])* $name:ident / $getter:ident ($arg:ty) -> $ret:ty;)*) => {
        impl Drawing {
            $(
                $(#[$meta])*
                pub fn $name(&self, value: impl Into<$arg>) -> $ret {
                    self.$getter().call(value)
                }

                pub fn $getter(&self) -> Delegate<$arg, $ret> {
                    self.delegate(GraphicsState::$name)
                }
            )*
        }
    };
}

gstate_delegates! {
    /// Fill color; no components disable filling.
    fill / fill_delegate(ColorArgs) -> ();
    /// Stroke color; no components disable stroking.
    stroke / stroke_delegate(ColorArgs) -> ();
    blend_mode / blend_mode_delegate(BlendMode) -> ();
    stroke_width / stroke_width_delegate(f64) -> ();
    line_cap / line_cap_delegate(LineCap) -> ();
    line_join / line_join_delegate(LineJoin) -> ();
    line_dash / line_dash_delegate(Vec<f64>) -> ();
    miter_limit / miter_limit_delegate(f64) -> ();
    /// Font by file path or system name. Returns the name it was loaded as.
    font / font_delegate(String) -> Result<String>;
    font_size / font_size_delegate(f64) -> ();
    open_type_features / open_type_features_delegate(Features) -> std::collections::BTreeMap<String, bool>;
    font_variations / font_variations_delegate(Variations) -> std::collections::BTreeMap<String, f64>;
    language / language_delegate(Option<String>) -> ();
}

/// Restore point returned by [`Drawing::saved_state_guard`].
///
/// Dropping the guard restores too; under [`UnwindPolicy::Leave`] a drop
/// during a panic leaves the state alone.
pub struct SavedState<'a> {
    drawing: &'a Drawing,
    armed: bool,
}

impl SavedState<'_> {
    pub fn restore(mut self) -> Result<()> {
        self.armed = false;
        self.drawing.core.borrow_mut().pop_state()
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for SavedState<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let Ok(mut core) = self.drawing.core.try_borrow_mut() else {
            error!("Drawing is in use, saved state can not be restored");
            return;
        };
        if std::thread::panicking() && core.unwind == UnwindPolicy::Leave {
            warn!("Leaving saved state {} unrestored while unwinding", core.stack.depth());
            return;
        }
        if let Err(err) = core.pop_state() {
            error!("Restoring saved state failed: {}", err);
        }
    }
}

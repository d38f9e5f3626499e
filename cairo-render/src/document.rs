use std::fs::File;
use std::path::Path;

use cairo::{Content, Context, Format, ImageSurface, PdfSurface, RecordingSurface, Rectangle, SvgSurface};
use drawing::canvas::Canvas;
use drawing::document::{
    indexed_paths, Document, OutputFormat, RasterFormat, SaveOptions, DEFAULT_FRAME_DURATION,
};
use drawing::error::{DrawError, Result};
use image::{DynamicImage, ImageFormat, RgbaImage};
use log::{debug, info, warn};

use crate::canvas::CairoCanvas;
use crate::video::VideoEncoder;

struct RecordedPage {
    surface: RecordingSurface,
    width: f64,
    height: f64,
    frame_duration: f64,
}

impl RecordedPage {
    /// Paints the recorded page onto `context` at the origin.
    fn replay(&self, context: &Context) -> Result<()> {
        context
            .set_source_surface(&self.surface, 0.0, 0.0)
            .map_err(DrawError::native)?;
        context.paint().map_err(DrawError::native)
    }

    fn pixel_size(&self) -> (i32, i32) {
        (
            self.width.ceil().max(1.0) as i32,
            self.height.ceil().max(1.0) as i32,
        )
    }

    /// Renders the page into an ARGB32 image, over white when `opaque`.
    fn rasterize(&self, opaque: bool) -> Result<ImageSurface> {
        let (width, height) = self.pixel_size();
        let surface =
            ImageSurface::create(Format::ARgb32, width, height).map_err(DrawError::native)?;
        {
            let context = Context::new(&surface).map_err(DrawError::native)?;
            if opaque {
                context.set_source_rgb(1.0, 1.0, 1.0);
                context.paint().map_err(DrawError::native)?;
            }
            self.replay(&context)?;
        }
        surface.flush();
        Ok(surface)
    }

    fn png_bytes(&self) -> Result<Vec<u8>> {
        let surface = self.rasterize(false)?;
        let mut buf = Vec::new();
        surface.write_to_png(&mut buf).map_err(DrawError::native)?;
        Ok(buf)
    }
}

/// Straight-alpha RGBA copy of a premultiplied ARGB32 surface.
fn to_rgba_image(mut surface: ImageSurface) -> Result<RgbaImage> {
    let (width, height) = (surface.width() as u32, surface.height() as u32);
    let stride = surface.stride() as usize;
    let data = surface.data().map_err(DrawError::native)?;
    let mut image = RgbaImage::new(width, height);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let o = y as usize * stride + x as usize * 4;
        let argb = u32::from_ne_bytes([data[o], data[o + 1], data[o + 2], data[o + 3]]);
        let a = (argb >> 24) as u8;
        let unpremultiply = |c: u32| {
            let c = c & 0xff;
            if a == 0 {
                0
            } else {
                ((c * 255 + a as u32 / 2) / a as u32).min(255) as u8
            }
        };
        pixel.0 = [
            unpremultiply(argb >> 16),
            unpremultiply(argb >> 8),
            unpremultiply(argb),
            a,
        ];
    }
    Ok(image)
}

fn image_format(format: RasterFormat) -> ImageFormat {
    match format {
        RasterFormat::Png => ImageFormat::Png,
        RasterFormat::Jpeg => ImageFormat::Jpeg,
        RasterFormat::Bmp => ImageFormat::Bmp,
        RasterFormat::Gif => ImageFormat::Gif,
        RasterFormat::Tiff => ImageFormat::Tiff,
        RasterFormat::Webp => ImageFormat::WebP,
    }
}

/// Records every page as a cairo recording surface and encodes them when
/// saved. The output kind is chosen by the extension passed to
/// [`Document::save_image`], so one document can be saved several ways.
pub struct RecordingDocument {
    pages: Vec<RecordedPage>,
    open: Option<RecordedPage>,
    last_size: Option<(f64, f64)>,
    frame_duration: f64,
}

impl Default for RecordingDocument {
    fn default() -> Self {
        RecordingDocument {
            pages: Vec::new(),
            open: None,
            last_size: None,
            frame_duration: DEFAULT_FRAME_DURATION,
        }
    }
}

impl RecordingDocument {
    pub fn new() -> Self {
        Self::default()
    }

    fn save_raster(&self, path: &Path, format: RasterFormat) -> Result<()> {
        for (page, target) in self.pages.iter().zip(indexed_paths(path, self.pages.len())) {
            debug!("Writing {}", target.display());
            if format == RasterFormat::Png {
                let surface = page.rasterize(false)?;
                let mut file = File::create(&target)?;
                surface.write_to_png(&mut file).map_err(DrawError::native)?;
                continue;
            }
            let image = to_rgba_image(page.rasterize(format.is_opaque())?)?;
            let image = DynamicImage::ImageRgba8(image);
            if format.is_opaque() {
                DynamicImage::ImageRgb8(image.to_rgb8())
                    .save_with_format(&target, image_format(format))?;
            } else {
                image.save_with_format(&target, image_format(format))?;
            }
        }
        Ok(())
    }

    fn save_svg(&self, path: &Path) -> Result<()> {
        for (page, target) in self.pages.iter().zip(indexed_paths(path, self.pages.len())) {
            debug!("Writing {}", target.display());
            let surface =
                SvgSurface::new(page.width, page.height, Some(&target)).map_err(DrawError::native)?;
            {
                let context = Context::new(&surface).map_err(DrawError::native)?;
                page.replay(&context)?;
            }
            surface.finish();
        }
        Ok(())
    }

    fn save_pdf(&self, path: &Path) -> Result<()> {
        let Some(first) = self.pages.first() else {
            return Err(DrawError::NoPages);
        };
        let surface =
            PdfSurface::new(first.width, first.height, path).map_err(DrawError::native)?;
        {
            let context = Context::new(&surface).map_err(DrawError::native)?;
            for page in &self.pages {
                surface
                    .set_size(page.width, page.height)
                    .map_err(DrawError::native)?;
                page.replay(&context)?;
                context.show_page().map_err(DrawError::native)?;
            }
        }
        surface.finish();
        Ok(())
    }

    fn save_video(&self, path: &Path, options: &SaveOptions) -> Result<()> {
        let Some(first) = self.pages.first() else {
            return Err(DrawError::NoPages);
        };
        if self
            .pages
            .iter()
            .any(|page| page.frame_duration != first.frame_duration)
        {
            warn!(
                "Pages have different frame durations, using {}s for all",
                first.frame_duration
            );
        }
        let mut encoder = VideoEncoder::new(first.frame_duration);
        if let Some(codec) = options.codec_name() {
            encoder = encoder.codec(codec);
        }
        encoder.encode(path, self.pages.iter().map(RecordedPage::png_bytes))
    }
}

impl Document for RecordingDocument {
    fn is_drawing(&self) -> bool {
        self.open.is_some()
    }

    fn page_width(&self) -> Option<f64> {
        self.last_size.map(|(w, _)| w)
    }

    fn page_height(&self) -> Option<f64> {
        self.last_size.map(|(_, h)| h)
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn begin_page(&mut self, width: f64, height: f64) -> Result<Box<dyn Canvas>> {
        if self.open.is_some() {
            return Err(DrawError::Protocol(
                "begin_page() called while a page is open".to_string(),
            ));
        }
        let extents = Rectangle::new(0.0, 0.0, width, height);
        let surface = RecordingSurface::create(Content::ColorAlpha, Some(extents))
            .map_err(DrawError::native)?;
        let context = Context::new(&surface).map_err(DrawError::native)?;
        self.open = Some(RecordedPage {
            surface,
            width,
            height,
            frame_duration: self.frame_duration,
        });
        self.last_size = Some((width, height));
        Ok(Box::new(CairoCanvas::new(context)))
    }

    fn end_page(&mut self) -> Result<()> {
        let mut page = self
            .open
            .take()
            .ok_or_else(|| DrawError::Protocol("end_page() called without an open page".to_string()))?;
        page.surface.flush();
        page.frame_duration = self.frame_duration;
        self.pages.push(page);
        Ok(())
    }

    fn set_frame_duration(&mut self, seconds: f64) {
        self.frame_duration = seconds;
    }

    fn save_image(&mut self, path: &Path, options: &SaveOptions) -> Result<()> {
        if self.pages.is_empty() {
            return Err(DrawError::NoPages);
        }
        let format = OutputFormat::from_path(path)?;
        info!(
            "Writing {} page(s) to {} as {:?}",
            self.pages.len(),
            path.display(),
            format
        );
        match format {
            OutputFormat::Raster(raster) => self.save_raster(path, raster),
            OutputFormat::Svg => self.save_svg(path),
            OutputFormat::Pdf => self.save_pdf(path),
            OutputFormat::Video => self.save_video(path, options),
        }
    }
}

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::canvas::{Canvas, TraceCanvas, TraceLog};
use crate::document::format::{indexed_paths, OutputFormat};
use crate::document::{Document, SaveOptions, DEFAULT_FRAME_DURATION};
use crate::error::{DrawError, Result};

/// A finished page of a [`TraceDocument`].
#[derive(Debug, Clone, PartialEq)]
pub struct TracePage {
    pub width: f64,
    pub height: f64,
    pub frame_duration: f64,
    pub calls: Vec<String>,
}

impl TracePage {
    fn text(&self) -> String {
        let mut out = format!("page {} {}\n", self.width, self.height);
        for call in &self.calls {
            out.push_str(call);
            out.push('\n');
        }
        out
    }
}

/// A document that keeps the canvas calls of every page as text and saves
/// them with the same file layout a rendering document would produce.
#[derive(Debug)]
pub struct TraceDocument {
    pages: Vec<TracePage>,
    open: Option<(f64, f64, TraceLog)>,
    last_size: Option<(f64, f64)>,
    frame_duration: f64,
}

impl Default for TraceDocument {
    fn default() -> Self {
        TraceDocument {
            pages: Vec::new(),
            open: None,
            last_size: None,
            frame_duration: DEFAULT_FRAME_DURATION,
        }
    }
}

impl TraceDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pages(&self) -> &[TracePage] {
        &self.pages
    }
}

impl Document for TraceDocument {
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
        debug!("Trace page {} begins ({} x {})", self.pages.len(), width, height);
        let log = TraceLog::default();
        self.open = Some((width, height, log.clone()));
        self.last_size = Some((width, height));
        Ok(Box::new(TraceCanvas::with_log(log)))
    }

    fn end_page(&mut self) -> Result<()> {
        let (width, height, log) = self
            .open
            .take()
            .ok_or_else(|| DrawError::Protocol("end_page() called without an open page".to_string()))?;
        let calls = log.borrow().clone();
        self.pages.push(TracePage {
            width,
            height,
            frame_duration: self.frame_duration,
            calls,
        });
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
        info!("Saving {} trace pages to {} as {:?}", self.pages.len(), path.display(), format);
        if format.file_per_page() {
            for (page, target) in self.pages.iter().zip(indexed_paths(path, self.pages.len())) {
                fs::write(target, page.text())?;
            }
            return Ok(());
        }

        let mut out = String::new();
        if format == OutputFormat::Video {
            let _ = writeln!(out, "codec {}", options.codec_name().unwrap_or("default"));
        }
        for page in &self.pages {
            if format == OutputFormat::Video {
                let _ = writeln!(out, "duration {}", page.frame_duration);
            }
            out.push_str(&page.text());
        }
        fs::write(path, out)?;
        Ok(())
    }
}

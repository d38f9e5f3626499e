pub mod canvas;
pub mod document;
pub mod video;

pub use canvas::CairoCanvas;
pub use document::RecordingDocument;

use drawing::{Drawing, DrawingConfig};

/// A drawing that records its pages with cairo.
pub fn new_drawing() -> Drawing {
    Drawing::new(RecordingDocument::new())
}

pub fn new_drawing_with_config(config: DrawingConfig) -> Drawing {
    Drawing::with_config(Box::new(RecordingDocument::new()), config)
}

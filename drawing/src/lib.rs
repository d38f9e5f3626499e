pub mod canvas;
pub mod color;
pub mod delegate;
pub mod document;
pub mod drawing;
pub mod error;
pub mod geom;
pub mod image_cache;
pub mod state;
pub mod text;

pub use color::{Argb, ColorArgs};
pub use delegate::Delegate;
pub use document::{Document, SaveOptions};
pub use drawing::{Drawing, DrawingConfig, SavedState};
pub use error::{DrawError, Result};
pub use geom::{coordinate::Point, path::BezierPath};
pub use state::{BlendMode, GraphicsState, LineCap, LineJoin, UnwindPolicy};
pub use text::TextAlign;

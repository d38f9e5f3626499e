pub mod graphics_state;
pub mod paint;
pub mod stack;

pub use graphics_state::GraphicsState;
pub use paint::{BlendMode, LineCap, LineJoin, Paint, PaintStyle};
pub use stack::{StateStack, UnwindPolicy};

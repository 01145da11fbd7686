//! Tree layout engine: node placement, label sizing and the view transform.
//!
//! Everything here is pure computation; no I/O.

pub mod text;
pub mod tidy;
pub mod viewport;

pub use text::{estimate_text_block_size, TextBlock, TextMetrics};
pub use tidy::{layout, Bounds, Connection, LayoutConfig, LayoutResult, PositionedNode};
pub use viewport::{Viewport, ViewportOptions};

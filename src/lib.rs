// Library exports for png2cur

pub mod config;
pub mod event;
pub mod pipeline;
pub mod pipeline_worker;

// Re-export commonly used types from pipeline
pub use pipeline::cursor_types::{Frame, Hotspot};
pub use pipeline::png2cur::{
    self, CursorBlob, CursorError, CursorFormat, encode_animation, encode_cursor, encode_frame,
};

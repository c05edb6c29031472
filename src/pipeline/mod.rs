pub mod cursor_types;
pub mod fs_ops;
pub mod png2cur;
pub mod png_source;

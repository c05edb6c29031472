//! Error types for the cursor encoder.

/// Errors raised while validating frames or assembling cursor files.
///
/// Every variant is an input-validation failure detected before any output
/// is produced, so an `Err` never comes with a partially written blob.
#[derive(Debug, thiserror::Error)]
pub enum CursorError {
    /// Zero dimension, or a pixel buffer that does not cover `width * height`.
    #[error("invalid frame{}: {reason}", frame_label(.frame))]
    InvalidFrame {
        frame: Option<usize>,
        reason: String,
    },

    /// A dimension or derived size does not fit the fields of the format.
    #[error("unsupported {field}{}: {value} (max {max})", frame_label(.frame))]
    UnsupportedDimension {
        frame: Option<usize>,
        field: &'static str,
        value: u64,
        max: u64,
    },

    /// Animation frames must all share the size declared in `anih`.
    #[error(
        "frame {index} is {width}x{height}, expected {expected_width}x{expected_height}"
    )]
    DimensionMismatch {
        index: usize,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },

    #[error("frame {index} has invalid delay {delay_ms} ms")]
    InvalidDelay { index: usize, delay_ms: f64 },

    #[error("no frames to encode")]
    NoFrames,

    #[error("write error: {0}")]
    Io(#[from] std::io::Error),
}

impl CursorError {
    pub(crate) fn invalid_frame(reason: impl Into<String>) -> Self {
        CursorError::InvalidFrame {
            frame: None,
            reason: reason.into(),
        }
    }

    /// Attach the index of the offending frame to a per-frame error.
    pub fn at_frame(self, index: usize) -> Self {
        match self {
            CursorError::InvalidFrame { reason, .. } => CursorError::InvalidFrame {
                frame: Some(index),
                reason,
            },
            CursorError::UnsupportedDimension {
                field, value, max, ..
            } => CursorError::UnsupportedDimension {
                frame: Some(index),
                field,
                value,
                max,
            },
            CursorError::InvalidDelay { delay_ms, .. } => CursorError::InvalidDelay {
                index,
                delay_ms,
            },
            other => other,
        }
    }
}

fn frame_label(frame: &Option<usize>) -> String {
    match frame {
        Some(index) => format!(" (frame {})", index),
        None => String::new(),
    }
}

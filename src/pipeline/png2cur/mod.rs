pub mod ani;
pub mod converter;
pub mod cur;
pub mod error;
pub mod riff;

#[cfg(test)]
pub(crate) mod reader;

pub use ani::{AniWriter, delay_to_jiffies, encode_animation};
pub use converter::ConversionOptions;
pub use cur::{CurWriter, encode_frame};
pub use error::CursorError;

use crate::pipeline::cursor_types::{Frame, Hotspot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorFormat {
    Cur,
    Ani,
}

impl CursorFormat {
    /// A single frame is a static cursor, anything more is animated.
    pub fn for_frame_count(count: usize) -> Self {
        if count > 1 {
            CursorFormat::Ani
        } else {
            CursorFormat::Cur
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            CursorFormat::Cur => "cur",
            CursorFormat::Ani => "ani",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CursorBlob {
    pub format: CursorFormat,
    pub data: Vec<u8>,
}

/// Encodes one frame as `.cur`, or several as `.ani`.
pub fn encode_cursor(frames: &[Frame], hotspot: Hotspot) -> Result<CursorBlob, CursorError> {
    let format = match frames {
        [] => return Err(CursorError::NoFrames),
        [_] => CursorFormat::Cur,
        _ => CursorFormat::Ani,
    };

    let data = match format {
        CursorFormat::Cur => encode_frame(&frames[0], hotspot)?,
        CursorFormat::Ani => encode_animation(frames, hotspot)?,
    };

    Ok(CursorBlob { format, data })
}

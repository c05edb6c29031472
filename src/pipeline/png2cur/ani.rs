use byteorder::{LittleEndian, WriteBytesExt};

use super::cur::CurWriter;
use super::error::CursorError;
use super::riff::{self, u32_payload};
use crate::pipeline::cursor_types::{Frame, Hotspot};

const ANI_TYPE: &[u8; 4] = b"ACON";
const HEADER_CHUNK: &[u8; 4] = b"anih";
const RATE_CHUNK: &[u8; 4] = b"rate";
const SEQ_CHUNK: &[u8; 4] = b"seq ";
const FRAME_TYPE: &[u8; 4] = b"fram";
const ICON_CHUNK: &[u8; 4] = b"icon";

const ANIH_SIZE: u32 = 36;
const ICON_FLAG: u32 = 0x1;
const SEQUENCE_FLAG: u32 = 0x2;

/// Milliseconds per jiffy (1/60 s).
pub const JIFFY_MS: f64 = 1000.0 / 60.0;

pub struct AniWriter;

#[derive(Debug, Clone, PartialEq, Eq)]
struct AnihHeader {
    frame_count: u32,
    step_count: u32,
    width: u32,
    height: u32,
    bit_count: u32,
    planes: u32,
    display_rate: u32,
    flags: u32,
}

impl AnihHeader {
    fn for_frames(frame_count: u32, width: u32, height: u32) -> Self {
        let mut flags = ICON_FLAG;
        if frame_count > 1 {
            flags |= SEQUENCE_FLAG;
        }

        Self {
            frame_count,
            step_count: frame_count,
            width,
            height,
            bit_count: 32,
            planes: 1,
            // per-frame rates always come from the rate chunk
            display_rate: 0,
            flags,
        }
    }

    fn to_bytes(&self) -> Result<Vec<u8>, CursorError> {
        let mut out = Vec::with_capacity(ANIH_SIZE as usize);
        for value in [
            ANIH_SIZE,
            self.frame_count,
            self.step_count,
            self.width,
            self.height,
            self.bit_count,
            self.planes,
            self.display_rate,
            self.flags,
        ] {
            out.write_u32::<LittleEndian>(value)?;
        }
        Ok(out)
    }
}

impl AniWriter {
    pub fn encode(frames: &[Frame], hotspot: Hotspot) -> Result<Vec<u8>, CursorError> {
        let first = frames.first().ok_or(CursorError::NoFrames)?;
        let (width, height) = first.size();

        // Validate everything up front so a failure never leaves half a file.
        let mut rates = Vec::with_capacity(frames.len());
        for (index, frame) in frames.iter().enumerate() {
            if frame.size() != (width, height) {
                return Err(CursorError::DimensionMismatch {
                    index,
                    width: frame.width,
                    height: frame.height,
                    expected_width: width,
                    expected_height: height,
                });
            }
            rates.push(delay_to_jiffies(frame.delay_ms).map_err(|e| e.at_frame(index))?);
        }

        let mut icons = Vec::new();
        for (index, frame) in frames.iter().enumerate() {
            let cur = CurWriter::encode(frame, hotspot).map_err(|e| e.at_frame(index))?;
            riff::write_chunk(&mut icons, ICON_CHUNK, &cur)?;
        }

        let frame_count = u32::try_from(frames.len()).map_err(|_| {
            CursorError::UnsupportedDimension {
                frame: None,
                field: "frame count",
                value: frames.len() as u64,
                max: u32::MAX as u64,
            }
        })?;
        let header = AnihHeader::for_frames(frame_count, width, height);
        let sequence: Vec<u32> = (0..frame_count).collect();

        let mut body = Vec::new();
        riff::write_chunk(&mut body, HEADER_CHUNK, &header.to_bytes()?)?;
        riff::write_chunk(&mut body, RATE_CHUNK, &u32_payload(&rates))?;
        riff::write_chunk(&mut body, SEQ_CHUNK, &u32_payload(&sequence))?;
        riff::write_list(&mut body, FRAME_TYPE, &icons)?;

        let out = riff::write_riff(ANI_TYPE, &body)?;

        log::debug!(
            "packed {} frames of {}x{} into {} byte ACON, rates {:?}",
            frame_count,
            width,
            height,
            out.len(),
            rates
        );

        Ok(out)
    }
}

/// Encodes frames (all the same size) as an animated `.ani` file.
pub fn encode_animation(frames: &[Frame], hotspot: Hotspot) -> Result<Vec<u8>, CursorError> {
    AniWriter::encode(frames, hotspot)
}

/// Converts a delay to jiffies, rounding to nearest (halves to even) and
/// never below 1.
///
/// The caller owns the frame index, so errors carry index 0 until
/// re-labelled with [`CursorError::at_frame`].
pub fn delay_to_jiffies(delay_ms: f64) -> Result<u32, CursorError> {
    if !delay_ms.is_finite() || delay_ms < 0.0 {
        return Err(CursorError::InvalidDelay { index: 0, delay_ms });
    }

    let jiffies = (delay_ms / JIFFY_MS).round_ties_even();
    Ok((jiffies.min(u32::MAX as f64) as u32).max(1))
}

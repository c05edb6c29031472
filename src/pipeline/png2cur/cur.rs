use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;

use super::error::CursorError;
use crate::pipeline::cursor_types::{Frame, Hotspot};

const ICO_TYPE_CUR: u16 = 2;
const ICONDIR_SIZE: u32 = 6;
const ICONDIRENTRY_SIZE: u32 = 16;
const BITMAPINFOHEADER_SIZE: u32 = 40;
const BITS_PER_PIXEL: u16 = 32;
const BI_RGB: u32 = 0;

/// Offset of the bitmap header in a single-entry cursor file.
pub const IMAGE_OFFSET: u32 = ICONDIR_SIZE + ICONDIRENTRY_SIZE;

/// Largest width or height the 16-bit fields can describe.
pub const MAX_DIMENSION: u32 = u16::MAX as u32;

pub struct CurWriter;

impl CurWriter {
    pub fn encode(frame: &Frame, hotspot: Hotspot) -> Result<Vec<u8>, CursorError> {
        let resource_size = Self::validate(frame)?;

        let xor = xor_plane(frame);
        let and = and_plane(frame);
        debug_assert_eq!(BITMAPINFOHEADER_SIZE as usize + xor.len() + and.len(), resource_size);

        let mut out = Vec::with_capacity(IMAGE_OFFSET as usize + resource_size);

        // ICONDIR
        out.write_u16::<LittleEndian>(0)?;
        out.write_u16::<LittleEndian>(ICO_TYPE_CUR)?;
        out.write_u16::<LittleEndian>(1)?;

        // ICONDIRENTRY
        out.write_u8(dimension_byte(frame.width))?;
        out.write_u8(dimension_byte(frame.height))?;
        out.write_u8(0)?; // color count
        out.write_u8(0)?; // reserved
        out.write_u16::<LittleEndian>(hotspot.x)?;
        out.write_u16::<LittleEndian>(hotspot.y)?;
        out.write_u32::<LittleEndian>(resource_size as u32)?;
        out.write_u32::<LittleEndian>(IMAGE_OFFSET)?;

        // BITMAPINFOHEADER
        out.write_u32::<LittleEndian>(BITMAPINFOHEADER_SIZE)?;
        out.write_u32::<LittleEndian>(frame.width)?;
        out.write_u32::<LittleEndian>(frame.height * 2)?; // XOR + AND planes
        out.write_u16::<LittleEndian>(1)?;
        out.write_u16::<LittleEndian>(BITS_PER_PIXEL)?;
        out.write_u32::<LittleEndian>(BI_RGB)?;
        out.write_u32::<LittleEndian>((xor.len() + and.len()) as u32)?;
        for _ in 0..4 {
            out.write_u32::<LittleEndian>(0)?;
        }

        out.write_all(&xor)?;
        out.write_all(&and)?;

        log::trace!(
            "encoded {}x{} cursor frame: {} bytes (xor {}, and {})",
            frame.width,
            frame.height,
            out.len(),
            xor.len(),
            and.len()
        );

        Ok(out)
    }

    /// Checks the frame and returns the size of its image resource
    /// (bitmap header + both planes).
    fn validate(frame: &Frame) -> Result<usize, CursorError> {
        if frame.width == 0 || frame.height == 0 {
            return Err(CursorError::invalid_frame(format!(
                "dimensions must be positive, got {}x{}",
                frame.width, frame.height
            )));
        }

        for (field, value) in [("width", frame.width), ("height", frame.height)] {
            if value > MAX_DIMENSION {
                return Err(CursorError::UnsupportedDimension {
                    frame: None,
                    field,
                    value: value as u64,
                    max: MAX_DIMENSION as u64,
                });
            }
        }

        let expected = frame.width as u64 * frame.height as u64;
        if frame.pixels.len() as u64 != expected {
            return Err(CursorError::invalid_frame(format!(
                "pixel buffer holds {} pixels, {}x{} needs {}",
                frame.pixels.len(),
                frame.width,
                frame.height,
                expected
            )));
        }

        let resource_size = BITMAPINFOHEADER_SIZE as u64
            + expected * 4
            + frame.height as u64 * row_bytes(frame.width) as u64;
        let max = (u32::MAX - IMAGE_OFFSET) as u64;
        if resource_size > max {
            return Err(CursorError::UnsupportedDimension {
                frame: None,
                field: "image size",
                value: resource_size,
                max,
            });
        }

        Ok(resource_size as usize)
    }
}

/// Encodes one frame as a complete single-image `.cur` file.
pub fn encode_frame(frame: &Frame, hotspot: Hotspot) -> Result<Vec<u8>, CursorError> {
    CurWriter::encode(frame, hotspot)
}

/// Bytes per row of the 1-bit AND mask, padded to a 32-bit boundary.
pub fn row_bytes(width: u32) -> u32 {
    width.div_ceil(32) * 4
}

/// Size of the file `encode_frame` produces for a frame of this size.
pub fn encoded_len(width: u32, height: u32) -> u64 {
    IMAGE_OFFSET as u64
        + BITMAPINFOHEADER_SIZE as u64
        + width as u64 * height as u64 * 4
        + height as u64 * row_bytes(width) as u64
}

/// 256 is stored as 0; larger sizes have no byte encoding and are stored as 0 too.
fn dimension_byte(value: u32) -> u8 {
    if value < 256 { value as u8 } else { 0 }
}

/// Colour plane, bottom-up rows of BGRA pixels.
fn xor_plane(frame: &Frame) -> Vec<u8> {
    let width = frame.width as usize;
    let mut plane = Vec::with_capacity(frame.pixels.len() * 4);

    for row in frame.pixels.chunks_exact(width).rev() {
        for pixel in row {
            let [r, g, b, a] = pixel.0;
            plane.extend_from_slice(&[b, g, r, a]);
        }
    }

    plane
}

/// Transparency plane, bottom-up, one bit per pixel set where alpha is 0.
fn and_plane(frame: &Frame) -> Vec<u8> {
    let width = frame.width as usize;
    let stride = row_bytes(frame.width) as usize;
    let mut plane = vec![0u8; stride * frame.height as usize];

    for (row, dst) in frame
        .pixels
        .chunks_exact(width)
        .rev()
        .zip(plane.chunks_exact_mut(stride))
    {
        for (x, pixel) in row.iter().enumerate() {
            if pixel[3] == 0 {
                dst[x / 8] |= 0x80 >> (x % 8);
            }
        }
    }

    plane
}

// RIFF chunk framing: 4-byte id, little-endian u32 length, payload, pad to even

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;

use super::error::CursorError;

pub const RIFF_CHUNK: &[u8; 4] = b"RIFF";
pub const LIST_CHUNK: &[u8; 4] = b"LIST";

fn chunk_len(len: usize) -> Result<u32, CursorError> {
    u32::try_from(len).map_err(|_| CursorError::UnsupportedDimension {
        frame: None,
        field: "chunk size",
        value: len as u64,
        max: u32::MAX as u64,
    })
}

/// Appends a chunk. The length field never counts the pad byte.
pub fn write_chunk(out: &mut Vec<u8>, id: &[u8; 4], payload: &[u8]) -> Result<(), CursorError> {
    let len = chunk_len(payload.len())?;

    out.write_all(id)?;
    out.write_u32::<LittleEndian>(len)?;
    out.write_all(payload)?;
    if payload.len() % 2 == 1 {
        out.write_u8(0)?;
    }

    Ok(())
}

/// Appends a `LIST` chunk whose payload is `list_type` followed by `body`.
pub fn write_list(
    out: &mut Vec<u8>,
    list_type: &[u8; 4],
    body: &[u8],
) -> Result<(), CursorError> {
    let mut payload = Vec::with_capacity(4 + body.len());
    payload.extend_from_slice(list_type);
    payload.extend_from_slice(body);
    write_chunk(out, LIST_CHUNK, &payload)
}

/// Wraps already framed chunks in a top-level `RIFF` container.
pub fn write_riff(form_type: &[u8; 4], body: &[u8]) -> Result<Vec<u8>, CursorError> {
    let mut out = Vec::with_capacity(12 + body.len() + 1);
    let mut payload = Vec::with_capacity(4 + body.len());
    payload.extend_from_slice(form_type);
    payload.extend_from_slice(body);
    write_chunk(&mut out, RIFF_CHUNK, &payload)?;
    Ok(out)
}

/// Packs a sequence of u32 values, as used by the `rate` and `seq ` chunks.
pub fn u32_payload(values: &[u32]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(values.len() * 4);
    for &value in values {
        payload.extend_from_slice(&value.to_le_bytes());
    }
    payload
}

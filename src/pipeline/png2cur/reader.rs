// Independent cursor decoder used by tests to check produced files

use anyhow::{Result, bail};
use byteorder::{LittleEndian, ReadBytesExt};
use image::{Rgba, RgbaImage};
use std::io::{Cursor, Read, Seek, SeekFrom};

const MAGIC: &[u8] = &[0x00, 0x00, 0x02, 0x00];

#[derive(Debug, Clone)]
pub struct DecodedCursor {
    pub entry_width: u8,
    pub entry_height: u8,
    pub hotspot: (u16, u16),
    pub bytes_in_res: u32,
    pub image_offset: u32,
    pub bi_height: i32,
    pub bi_size_image: u32,
    pub image: RgbaImage,
    /// Row-major, top-down: true where the AND mask bit is set.
    pub mask: Vec<bool>,
}

#[derive(Debug, Clone)]
pub struct DecodedAnimation {
    pub anih: [u32; 9],
    pub rates: Vec<u32>,
    pub sequence: Vec<u32>,
    pub frames: Vec<DecodedCursor>,
    /// (id, declared length) of every top-level chunk in order.
    pub chunks: Vec<([u8; 4], u32)>,
}

pub struct CurParser;

impl CurParser {
    pub fn parse(data: &[u8]) -> Result<DecodedCursor> {
        if data.len() < 22 || &data[0..4] != MAGIC {
            bail!("Not a valid .CUR file");
        }

        let mut cursor = Cursor::new(data);
        cursor.seek(SeekFrom::Start(4))?;
        let count = cursor.read_u16::<LittleEndian>()?;
        if count != 1 {
            bail!("Expected exactly one image, found {}", count);
        }

        let entry_width = cursor.read_u8()?;
        let entry_height = cursor.read_u8()?;
        let _color_count = cursor.read_u8()?;
        let _reserved = cursor.read_u8()?;
        let hotspot_x = cursor.read_u16::<LittleEndian>()?;
        let hotspot_y = cursor.read_u16::<LittleEndian>()?;
        let bytes_in_res = cursor.read_u32::<LittleEndian>()?;
        let image_offset = cursor.read_u32::<LittleEndian>()?;

        if image_offset as usize + bytes_in_res as usize != data.len() {
            bail!("Image resource does not end at end of file");
        }

        cursor.seek(SeekFrom::Start(image_offset as u64))?;
        let header_size = cursor.read_u32::<LittleEndian>()?;
        if header_size != 40 {
            bail!("Unexpected DIB header size {}", header_size);
        }
        let width = cursor.read_i32::<LittleEndian>()?;
        let bi_height = cursor.read_i32::<LittleEndian>()?;
        let _planes = cursor.read_u16::<LittleEndian>()?;
        let bit_count = cursor.read_u16::<LittleEndian>()?;
        if bit_count != 32 {
            bail!("Only 32-bit cursors are decoded, got {}", bit_count);
        }
        let _compression = cursor.read_u32::<LittleEndian>()?;
        let bi_size_image = cursor.read_u32::<LittleEndian>()?;
        cursor.seek(SeekFrom::Current(16))?;

        let width = width as u32;
        let height = (bi_height / 2) as u32;

        let mut image = RgbaImage::new(width, height);
        for y in (0..height).rev() {
            for x in 0..width {
                let mut bgra = [0u8; 4];
                cursor.read_exact(&mut bgra)?;
                image.put_pixel(x, y, Rgba([bgra[2], bgra[1], bgra[0], bgra[3]]));
            }
        }

        let stride = width.div_ceil(32) as usize * 4;
        let mut mask = vec![false; (width * height) as usize];
        let mut row = vec![0u8; stride];
        for y in (0..height as usize).rev() {
            cursor.read_exact(&mut row)?;
            for x in 0..width as usize {
                mask[y * width as usize + x] = row[x / 8] & (0x80 >> (x % 8)) != 0;
            }
        }

        Ok(DecodedCursor {
            entry_width,
            entry_height,
            hotspot: (hotspot_x, hotspot_y),
            bytes_in_res,
            image_offset,
            bi_height,
            bi_size_image,
            image,
            mask,
        })
    }
}

pub struct AniParser;

impl AniParser {
    pub fn parse(data: &[u8]) -> Result<DecodedAnimation> {
        if data.len() < 12 || &data[0..4] != b"RIFF" || &data[8..12] != b"ACON" {
            bail!("Not a valid .ANI file");
        }

        let mut cursor = Cursor::new(data);
        cursor.seek(SeekFrom::Start(4))?;
        let riff_size = cursor.read_u32::<LittleEndian>()?;
        if riff_size as usize + 8 != data.len() {
            bail!("RIFF size {} does not match file length {}", riff_size, data.len());
        }
        cursor.seek(SeekFrom::Start(12))?;

        let mut anih = None;
        let mut rates = Vec::new();
        let mut sequence = Vec::new();
        let mut frames = Vec::new();
        let mut chunks = Vec::new();

        while (cursor.position() as usize) < data.len() {
            let (name, size, data_start) = Self::read_chunk(&mut cursor)?;
            chunks.push((name, size));

            match &name {
                b"anih" => {
                    let mut fields = [0u32; 9];
                    for field in &mut fields {
                        *field = cursor.read_u32::<LittleEndian>()?;
                    }
                    anih = Some(fields);
                }
                b"rate" => rates = Self::read_u32s(&mut cursor, size)?,
                b"seq " => sequence = Self::read_u32s(&mut cursor, size)?,
                b"LIST" => {
                    let mut list_type = [0u8; 4];
                    cursor.read_exact(&mut list_type)?;
                    if &list_type != b"fram" {
                        bail!("Unexpected LIST type");
                    }
                    let end = data_start + size as u64;
                    while cursor.position() < end {
                        let (icon, icon_size, icon_start) = Self::read_chunk(&mut cursor)?;
                        if &icon != b"icon" {
                            bail!("Expected icon chunk in frame list");
                        }
                        let start = icon_start as usize;
                        let stop = start + icon_size as usize;
                        if stop > data.len() {
                            bail!("Icon data extends beyond file");
                        }
                        frames.push(CurParser::parse(&data[start..stop])?);
                        Self::skip_to(&mut cursor, icon_start, icon_size)?;
                    }
                }
                _ => bail!("Unexpected chunk {:?}", String::from_utf8_lossy(&name)),
            }

            Self::skip_to(&mut cursor, data_start, size)?;
        }

        let Some(anih) = anih else {
            bail!("Missing anih chunk");
        };

        Ok(DecodedAnimation {
            anih,
            rates,
            sequence,
            frames,
            chunks,
        })
    }

    fn read_chunk(cursor: &mut Cursor<&[u8]>) -> Result<([u8; 4], u32, u64)> {
        let mut name = [0u8; 4];
        cursor.read_exact(&mut name)?;
        let size = cursor.read_u32::<LittleEndian>()?;
        let data_start = cursor.position();
        Ok((name, size, data_start))
    }

    /// Moves past a chunk payload and its pad byte, requiring the pad to be zero.
    fn skip_to(cursor: &mut Cursor<&[u8]>, data_start: u64, size: u32) -> Result<()> {
        cursor.seek(SeekFrom::Start(data_start + size as u64))?;
        if size % 2 == 1 && cursor.read_u8()? != 0 {
            bail!("Non-zero pad byte");
        }
        Ok(())
    }

    fn read_u32s(cursor: &mut Cursor<&[u8]>, size: u32) -> Result<Vec<u32>> {
        let mut values = Vec::new();
        for _ in 0..size / 4 {
            values.push(cursor.read_u32::<LittleEndian>()?);
        }
        Ok(values)
    }
}

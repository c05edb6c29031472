// Frame and hotspot types shared by the image source and the encoder

use image::{Rgba, RgbaImage};

/// One RGBA raster, row-major and top-down, plus its display duration.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgba<u8>>,
    /// Only used when the frame is part of an animation.
    pub delay_ms: f64,
}

impl Frame {
    pub fn new(width: u32, height: u32, pixels: Vec<Rgba<u8>>, delay_ms: f64) -> Self {
        Self {
            width,
            height,
            pixels,
            delay_ms,
        }
    }

    pub fn from_rgba_image(image: &RgbaImage, delay_ms: f64) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            pixels: image.pixels().copied().collect(),
            delay_ms,
        }
    }

    pub fn filled(width: u32, height: u32, color: Rgba<u8>) -> Self {
        Self::new(width, height, vec![color; (width * height) as usize], 0.0)
    }

    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Click point of the cursor, relative to the top-left corner of a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hotspot {
    pub x: u16,
    pub y: u16,
}

impl Hotspot {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    pub fn center_of(frame: &Frame) -> Self {
        Self {
            x: (frame.width / 2).min(u16::MAX as u32) as u16,
            y: (frame.height / 2).min(u16::MAX as u32) as u16,
        }
    }

    pub fn is_inside(&self, frame: &Frame) -> bool {
        (self.x as u32) < frame.width && (self.y as u32) < frame.height
    }
}

impl std::str::FromStr for Hotspot {
    type Err = String;

    /// Parses `X,Y`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y but got '{}'", s))?;
        let x = x
            .trim()
            .parse::<u16>()
            .map_err(|e| format!("invalid hotspot x '{}': {}", x.trim(), e))?;
        let y = y
            .trim()
            .parse::<u16>()
            .map_err(|e| format!("invalid hotspot y '{}': {}", y.trim(), e))?;
        Ok(Self { x, y })
    }
}

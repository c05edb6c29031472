// High-level conversion API for PNG to Windows cursor conversion

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{CursorBlob, CursorError, CursorFormat, encode_cursor};
use crate::pipeline::cursor_types::{Frame, Hotspot};
use crate::pipeline::fs_ops;
use crate::pipeline::png_source::{self, DEFAULT_DELAY_MS};

#[derive(Debug, Clone)]
pub struct ConversionOptions {
    /// Defaults to the centre of the first frame.
    pub hotspot: Option<Hotspot>,
    /// Replaces the delay of every frame.
    pub delay_ms: Option<f64>,
    /// Per-frame delays by zero-based index, applied after `delay_ms`.
    pub frame_delays: BTreeMap<usize, f64>,
    /// Used for animation frames that carry no delay of their own.
    pub default_delay_ms: f64,
    pub overwrite: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            hotspot: None,
            delay_ms: None,
            frame_delays: BTreeMap::new(),
            default_delay_ms: DEFAULT_DELAY_MS,
            overwrite: false,
        }
    }
}

impl ConversionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hotspot(mut self, hotspot: Hotspot) -> Self {
        self.hotspot = Some(hotspot);
        self
    }

    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }

    pub fn with_frame_delay(mut self, index: usize, delay_ms: f64) -> Self {
        self.frame_delays.insert(index, delay_ms);
        self
    }

    pub fn with_default_delay(mut self, delay_ms: f64) -> Self {
        self.default_delay_ms = delay_ms;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Applies the delay edits to `frames` and resolves the hotspot.
    pub fn apply(&self, frames: &mut [Frame]) -> Result<Hotspot, CursorError> {
        let first = frames.first().ok_or(CursorError::NoFrames)?;
        let hotspot = self.hotspot.unwrap_or_else(|| Hotspot::center_of(first));

        if let Some(delay_ms) = self.delay_ms {
            check_delay(0, delay_ms)?;
            for frame in frames.iter_mut() {
                frame.delay_ms = delay_ms;
            }
        }

        for (&index, &delay_ms) in &self.frame_delays {
            check_delay(index, delay_ms)?;
            let frame_count = frames.len();
            let frame = frames.get_mut(index).ok_or_else(|| CursorError::InvalidFrame {
                frame: Some(index),
                reason: format!("delay set for a frame that does not exist ({} frames)", frame_count),
            })?;
            frame.delay_ms = delay_ms;
        }

        Ok(hotspot)
    }
}

fn check_delay(index: usize, delay_ms: f64) -> Result<(), CursorError> {
    if delay_ms.is_finite() && delay_ms >= 0.0 {
        Ok(())
    } else {
        Err(CursorError::InvalidDelay { index, delay_ms })
    }
}

/// Encodes in-memory frames after applying `options`.
pub fn convert_frames<F>(
    mut frames: Vec<Frame>,
    options: &ConversionOptions,
    mut log_fn: F,
) -> Result<CursorBlob>
where
    F: FnMut(String),
{
    let hotspot = options.apply(&mut frames)?;

    if let Some(first) = frames.first() {
        if !hotspot.is_inside(first) {
            log_fn(format!(
                "Warning: hotspot ({}, {}) lies outside the {}x{} frame",
                hotspot.x, hotspot.y, first.width, first.height
            ));
        }
    }

    let blob = encode_cursor(&frames, hotspot)?;
    log_fn(format!(
        "Encoded {} frame(s) as .{} ({} bytes, hotspot {},{})",
        frames.len(),
        blob.format.extension(),
        blob.data.len(),
        hotspot.x,
        hotspot.y
    ));

    Ok(blob)
}

/// Converts an image file and writes the cursor.
///
/// Without an explicit `output_path` the cursor lands next to the input, with
/// `.cur` for a still image and `.ani` for an animation. Returns the written path.
pub fn convert_png<F>(
    input_path: &Path,
    output_path: Option<&Path>,
    options: &ConversionOptions,
    log_fn: F,
) -> Result<PathBuf>
where
    F: FnMut(String),
{
    convert_png_to(
        input_path,
        |format| match output_path {
            Some(path) => path.to_path_buf(),
            None => fs_ops::output_path_for(input_path, format),
        },
        options,
        log_fn,
    )
}

/// Converts an image file found under `input_root` into `output_dir`, at the
/// same relative path.
pub fn convert_png_into_dir<F>(
    input_path: &Path,
    input_root: &Path,
    output_dir: &Path,
    options: &ConversionOptions,
    log_fn: F,
) -> Result<PathBuf>
where
    F: FnMut(String),
{
    convert_png_to(
        input_path,
        |format| fs_ops::output_path_under(output_dir, input_root, input_path, format),
        options,
        log_fn,
    )
}

fn convert_png_to<P, F>(
    input_path: &Path,
    output_for: P,
    options: &ConversionOptions,
    mut log_fn: F,
) -> Result<PathBuf>
where
    P: FnOnce(CursorFormat) -> PathBuf,
    F: FnMut(String),
{
    let frames = png_source::load_frames(input_path, options.default_delay_ms)?;
    log_fn(format!(
        "Loaded {} frame(s) from {}",
        frames.len(),
        input_path.display()
    ));

    let blob = convert_frames(frames, options, &mut log_fn)
        .with_context(|| format!("Failed to convert {}", input_path.display()))?;

    let output = output_for(blob.format);
    fs_ops::write_cursor(&output, &blob.data, options.overwrite)?;
    log_fn(format!("Saved {}", output.display()));

    Ok(output)
}

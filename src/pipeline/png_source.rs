// Image loading: PNG and APNG files into encoder frames

use anyhow::{Context, Result, bail};
use image::AnimationDecoder;
use image::codecs::png::PngDecoder;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::cursor_types::Frame;

/// Delay given to animation frames stored with a zero delay.
pub const DEFAULT_DELAY_MS: f64 = 100.0;

fn is_png(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("png"))
        .unwrap_or(false)
}

/// Loads every frame of an image.
///
/// Animated PNGs give one frame per animation step, each with its own delay
/// (`default_delay_ms` when the file stores 0 ms). Still images, PNG or any
/// other format `image` decodes, give a single frame with delay 0.
pub fn load_frames(path: &Path, default_delay_ms: f64) -> Result<Vec<Frame>> {
    if is_png(path) {
        let file = File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let decoder = PngDecoder::new(BufReader::new(file))
            .with_context(|| format!("Failed to read PNG header of {}", path.display()))?;

        if decoder.is_apng().context("Failed to inspect PNG animation data")? {
            return load_apng_frames(decoder, default_delay_ms)
                .with_context(|| format!("Failed to decode APNG {}", path.display()));
        }
    }

    let image = image::open(path)
        .with_context(|| format!("Failed to decode image {}", path.display()))?
        .to_rgba8();

    Ok(vec![Frame::from_rgba_image(&image, 0.0)])
}

fn load_apng_frames(
    decoder: PngDecoder<BufReader<File>>,
    default_delay_ms: f64,
) -> Result<Vec<Frame>> {
    let frames = decoder.apng()?.into_frames().collect_frames()?;
    if frames.is_empty() {
        bail!("Animation contains no frames");
    }

    Ok(frames
        .into_iter()
        .map(|frame| {
            let (numer, denom) = frame.delay().numer_denom_ms();
            // a zero delay counts as unset
            let delay_ms = if numer == 0 {
                default_delay_ms
            } else {
                numer as f64 / denom as f64
            };
            Frame::from_rgba_image(frame.buffer(), delay_ms)
        })
        .collect())
}

/// One line per frame, in the style of the frame list shown before conversion.
pub fn describe_frames(frames: &[Frame]) -> Vec<String> {
    if let [frame] = frames {
        return vec![format!("Single Frame (Size: {}x{})", frame.width, frame.height)];
    }

    frames
        .iter()
        .enumerate()
        .map(|(idx, frame)| {
            format!(
                "Frame {} (Delay: {} ms, Size: {}x{})",
                idx + 1,
                frame.delay_ms,
                frame.width,
                frame.height
            )
        })
        .collect()
}

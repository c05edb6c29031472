use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

use super::png2cur::CursorFormat;

pub fn ensure_dir<P: AsRef<Path>>(p: P) -> std::io::Result<()> {
    if !p.as_ref().exists() {
        fs::create_dir_all(&p)?;
    }
    Ok(())
}

/// `dir/name.png` becomes `dir/name.cur` or `dir/name.ani`.
pub fn output_path_for(input: &Path, format: CursorFormat) -> PathBuf {
    input.with_extension(format.extension())
}

/// Same as [`output_path_for`] but placed in another directory.
pub fn output_path_in(dir: &Path, input: &Path, format: CursorFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("cursor");
    dir.join(format!("{}.{}", stem, format.extension()))
}

/// Mirrors `input`'s place under `input_root` into `dir`, so
/// `in/nested/a.png` becomes `out/nested/a.cur`. Inputs outside `input_root`
/// fall back to [`output_path_in`].
pub fn output_path_under(
    dir: &Path,
    input_root: &Path,
    input: &Path,
    format: CursorFormat,
) -> PathBuf {
    match input.strip_prefix(input_root) {
        Ok(relative) if relative.file_stem().is_some() => {
            dir.join(relative).with_extension(format.extension())
        }
        _ => output_path_in(dir, input, format),
    }
}

pub fn write_cursor(path: &Path, data: &[u8], overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        bail!("{} already exists", path.display());
    }
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))
}

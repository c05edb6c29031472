// Pipeline worker for converting folders of PNG images in a separate thread

use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use walkdir::WalkDir;

use crate::event::AppMsg;
use crate::pipeline::png2cur::ConversionOptions;
use crate::pipeline::png2cur::converter::convert_png_into_dir;

pub struct PipelineWorker {
    tx: Sender<AppMsg>,
}

impl PipelineWorker {
    pub fn new(tx: Sender<AppMsg>) -> Self {
        Self { tx }
    }

    /// Converts every PNG under `input_dir` into `output_dir`, keeping
    /// subdirectories.
    /// `thread_count` of 0 uses rayon's default pool size.
    pub fn start_png_to_cursor_conversion(
        &self,
        input_dir: PathBuf,
        output_dir: PathBuf,
        options: ConversionOptions,
        thread_count: usize,
    ) -> JoinHandle<()> {
        let tx = self.tx.clone();

        thread::spawn(move || {
            if let Err(e) =
                Self::run_png_pipeline(&input_dir, &output_dir, &options, thread_count, &tx)
            {
                let _ = tx.send(AppMsg::PipelineFailed(format!("{:#}", e)));
            }
        })
    }

    fn run_png_pipeline(
        input_dir: &Path,
        output_dir: &Path,
        options: &ConversionOptions,
        thread_count: usize,
        tx: &Sender<AppMsg>,
    ) -> Result<()> {
        let png_files = find_png_files(input_dir);

        let total_files = png_files.len();
        if total_files == 0 {
            let _ = tx.send(AppMsg::PipelineFailed(format!(
                "No .png files found in {}",
                input_dir.display()
            )));
            return Ok(());
        }

        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;
        let _ = tx.send(AppMsg::PipelineStarted(total_files));
        let _ = tx.send(AppMsg::LogMessage(format!(
            "Found {} PNG files to convert",
            total_files
        )));

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .build()
            .context("Failed to build worker pool")?;

        let done = AtomicUsize::new(0);
        let processed = pool.install(|| {
            png_files
                .par_iter()
                .map(|png_file| {
                    let file_name = png_file
                        .file_name()
                        .and_then(|s| s.to_str())
                        .unwrap_or("image");

                    let result =
                        convert_png_into_dir(png_file, input_dir, output_dir, options, |msg| {
                            let _ = tx.send(AppMsg::LogMessage(format!("  {}", msg)));
                        });

                    let ok = match result {
                        Ok(path) => {
                            let _ = tx.send(AppMsg::CursorWritten(path));
                            true
                        }
                        Err(e) => {
                            let _ = tx.send(AppMsg::LogMessage(format!(
                                "  ✗ Failed to convert {}: {:#}",
                                file_name, e
                            )));
                            false
                        }
                    };

                    let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                    let _ = tx.send(AppMsg::PipelineProgress(finished, total_files));
                    ok
                })
                .filter(|ok| *ok)
                .count()
        });

        let failed = total_files - processed;
        if failed > 0 {
            let _ = tx.send(AppMsg::LogMessage(format!(
                "Completed with {} successes and {} failures",
                processed, failed
            )));
        }

        let _ = tx.send(AppMsg::PipelineCompleted(processed));
        Ok(())
    }
}

/// PNG files under `dir`, sorted so runs are reproducible.
pub fn find_png_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("png"))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    #[test]
    fn test_batch_conversion_reports_progress() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        fs::create_dir_all(input.join("nested")).unwrap();

        RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 255]))
            .save(input.join("a.png"))
            .unwrap();
        RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 0]))
            .save(input.join("nested").join("b.png"))
            .unwrap();
        fs::write(input.join("notes.txt"), "skip me").unwrap();
        fs::write(input.join("broken.png"), "not a png").unwrap();

        let (tx, rx) = unbounded();
        let worker = PipelineWorker::new(tx);
        worker
            .start_png_to_cursor_conversion(input, output.clone(), ConversionOptions::new(), 2)
            .join()
            .unwrap();
        drop(worker);

        let messages: Vec<AppMsg> = rx.iter().collect();
        assert!(matches!(messages[0], AppMsg::PipelineStarted(3)));
        assert!(matches!(messages.last(), Some(AppMsg::PipelineCompleted(2))));

        let progress = messages
            .iter()
            .filter(|m| matches!(m, AppMsg::PipelineProgress(_, 3)))
            .count();
        assert_eq!(progress, 3);

        assert!(output.join("a.cur").exists());
        assert!(output.join("nested").join("b.cur").exists());
        assert!(!output.join("broken.cur").exists());
    }

    #[test]
    fn test_same_name_in_subdirectories_does_not_collide() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        fs::create_dir_all(input.join("nested")).unwrap();

        RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]))
            .save(input.join("a.png"))
            .unwrap();
        RgbaImage::from_pixel(3, 3, Rgba([0, 255, 0, 255]))
            .save(input.join("nested").join("a.png"))
            .unwrap();

        let (tx, rx) = unbounded();
        let worker = PipelineWorker::new(tx);
        worker
            .start_png_to_cursor_conversion(input, output.clone(), ConversionOptions::new(), 2)
            .join()
            .unwrap();
        drop(worker);

        let messages: Vec<AppMsg> = rx.iter().collect();
        assert!(matches!(messages.last(), Some(AppMsg::PipelineCompleted(2))));

        let top = fs::read(output.join("a.cur")).unwrap();
        let nested = fs::read(output.join("nested").join("a.cur")).unwrap();
        assert_eq!((top[6], top[7]), (2, 2));
        assert_eq!((nested[6], nested[7]), (3, 3));
    }

    #[test]
    fn test_empty_input_fails() {
        let dir = tempdir().unwrap();
        let (tx, rx) = unbounded();
        let worker = PipelineWorker::new(tx);
        worker
            .start_png_to_cursor_conversion(
                dir.path().to_path_buf(),
                dir.path().join("out"),
                ConversionOptions::new(),
                0,
            )
            .join()
            .unwrap();
        drop(worker);

        let messages: Vec<AppMsg> = rx.iter().collect();
        assert!(matches!(messages.as_slice(), [AppMsg::PipelineFailed(_)]));
        assert!(!dir.path().join("out").exists());
    }
}

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use crossbeam_channel::unbounded;
use std::path::PathBuf;

use png2cur::Hotspot;
use png2cur::config::Config;
use png2cur::event::AppMsg;
use png2cur::pipeline::png2cur::ConversionOptions;
use png2cur::pipeline::png2cur::converter::convert_png;
use png2cur::pipeline::png_source::{describe_frames, load_frames};
use png2cur::pipeline_worker::PipelineWorker;

#[derive(Parser)]
#[command(name = "png2cur")]
#[command(about = "Convert PNG and APNG images to Windows .cur and .ani cursors")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one image; animated PNGs become .ani, still images .cur
    Convert {
        input: PathBuf,

        /// Output path (defaults to the input name with .cur or .ani)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Click point as X,Y (defaults to the image centre)
        #[arg(long)]
        hotspot: Option<Hotspot>,

        /// Delay in ms applied to every frame
        #[arg(short, long)]
        delay: Option<f64>,

        /// Delay for a single frame as INDEX=MS (zero-based, repeatable)
        #[arg(long = "frame-delay", value_parser = parse_frame_delay)]
        frame_delays: Vec<(usize, f64)>,

        /// Replace the output file if it exists
        #[arg(short, long)]
        force: bool,
    },

    /// List the frames of an image
    Info { input: PathBuf },

    /// Convert every PNG under a directory
    Batch {
        input_dir: Option<PathBuf>,
        output_dir: Option<PathBuf>,

        #[arg(long)]
        hotspot: Option<Hotspot>,

        #[arg(short, long)]
        delay: Option<f64>,

        /// Worker threads (0 = one per CPU)
        #[arg(short, long)]
        threads: Option<usize>,

        #[arg(short, long)]
        force: bool,
    },

    /// Print the effective configuration
    Config,
}

fn parse_frame_delay(s: &str) -> Result<(usize, f64), String> {
    let (index, delay) = s
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=MS but got '{}'", s))?;
    let index = index
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid frame index '{}': {}", index, e))?;
    let delay = delay
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid delay '{}': {}", delay, e))?;
    if !delay.is_finite() || delay < 0.0 {
        return Err("Delay must be a non-negative number.".to_string());
    }
    Ok((index, delay))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };

    match cli.command {
        Commands::Convert {
            input,
            output,
            hotspot,
            delay,
            frame_delays,
            force,
        } => {
            let mut options = config
                .conversion_options()
                .with_overwrite(force || config.overwrite);
            if let Some(hotspot) = hotspot {
                options = options.with_hotspot(hotspot);
            }
            if let Some(delay) = delay {
                options = options.with_delay(delay);
            }
            for (index, delay) in frame_delays {
                options = options.with_frame_delay(index, delay);
            }

            let path = convert_png(&input, output.as_deref(), &options, |msg| {
                log::info!("{}", msg)
            })?;
            println!("{}", path.display());
        }
        Commands::Info { input } => {
            let frames = load_frames(&input, config.default_delay_ms)?;
            for line in describe_frames(&frames) {
                println!("{}", line);
            }
        }
        Commands::Batch {
            input_dir,
            output_dir,
            hotspot,
            delay,
            threads,
            force,
        } => {
            let input_dir = input_dir.unwrap_or_else(|| config.input_dir.clone());
            let output_dir = output_dir.unwrap_or_else(|| config.output_dir.clone());

            let mut options: ConversionOptions =
                config.conversion_options().with_overwrite(force || config.overwrite);
            if let Some(hotspot) = hotspot {
                options = options.with_hotspot(hotspot);
            }
            if let Some(delay) = delay {
                options = options.with_delay(delay);
            }

            let (tx, rx) = unbounded();
            let worker = PipelineWorker::new(tx);
            let handle = worker.start_png_to_cursor_conversion(
                input_dir,
                output_dir,
                options,
                threads.unwrap_or(config.thread_count),
            );
            drop(worker);

            let mut outcome = Ok(());
            for msg in rx {
                match msg {
                    AppMsg::PipelineStarted(total) => log::info!("Converting {} files", total),
                    AppMsg::PipelineProgress(done, total) => log::debug!("{}/{}", done, total),
                    AppMsg::CursorWritten(path) => println!("{}", path.display()),
                    AppMsg::LogMessage(line) => log::info!("{}", line),
                    AppMsg::PipelineCompleted(count) => log::info!("Converted {} files", count),
                    AppMsg::PipelineFailed(reason) => outcome = Err(anyhow!(reason)),
                }
            }
            handle
                .join()
                .map_err(|_| anyhow!("Batch worker panicked"))?;
            outcome?;
        }
        Commands::Config => {
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}

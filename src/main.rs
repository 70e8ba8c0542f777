use std::path::PathBuf;

use clap::Parser;
use facemesh_overlay::{app, Config};

/// Triangulated face mesh over a live webcam feed.
///
/// Keys: B background, F fill, H hide lines, Esc quit. Click toggles fullscreen.
#[derive(Parser, Debug)]
#[command(name = "facemesh-overlay", version, about)]
struct Args {
    /// Configuration file path (default: ./facemesh.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Camera device index (overrides config)
    #[arg(long)]
    camera: Option<u32>,

    /// Use a still image instead of the camera
    #[arg(long)]
    image: Option<PathBuf>,

    /// Landmark detector program (overrides config)
    #[arg(long)]
    detector: Option<String>,

    /// Arguments passed to the detector program (overrides config)
    #[arg(long = "detector-arg", allow_hyphen_values = true)]
    detector_args: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(camera) = args.camera {
        config.capture.camera_index = camera;
    }
    if let Some(image) = args.image {
        config.capture.still_image = Some(image);
    }
    if let Some(detector) = args.detector {
        config.detector.command = detector;
    }
    if !args.detector_args.is_empty() {
        config.detector.args = args.detector_args;
    }
    config.validate()?;

    app::run(&config)?;
    Ok(())
}

//! softras command line: render an OBJ model to an image file

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use softras::renderer::{save_resource, show_preview, RasterizationRenderer, RenderError};
use softras::settings::{load_settings, save_settings, Settings};
use softras::VERSION;

/// Render a Wavefront OBJ model with the software rasterizer
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// RON settings file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// OBJ model to render
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Output image (format from extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long)]
    width: Option<usize>,

    /// Image height in pixels
    #[arg(long)]
    height: Option<usize>,

    /// Show the result in a window
    #[arg(long)]
    preview: bool,

    /// Write the effective settings to this file and exit
    #[arg(long)]
    write_config: Option<PathBuf>,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(model) = &self.model {
            settings.model_path = model.clone();
        }
        if let Some(output) = &self.output {
            settings.result_path = output.clone();
        }
        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        if self.preview {
            settings.preview = true;
        }
    }
}

fn run(args: &Args) -> Result<(), RenderError> {
    let mut settings = match &args.config {
        Some(path) => {
            info!("Loading settings from {}", path.display());
            load_settings(path)?
        }
        None => Settings::default(),
    };
    args.apply(&mut settings);

    if let Some(path) = &args.write_config {
        save_settings(&settings, path)?;
        info!("Wrote settings to {}", path.display());
        return Ok(());
    }

    let renderer = RasterizationRenderer::new(settings);
    let frame = renderer.render()?;

    let settings = renderer.settings();
    save_resource(&frame.color, &settings.result_path)?;
    info!("Saved {}", settings.result_path.display());

    if settings.preview {
        show_preview(&format!("softras v{}", VERSION), &frame.color);
    }
    Ok(())
}

fn main() -> ExitCode {
    // Default filter is "info" if RUST_LOG is not set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();
    info!("=== softras v{} ===", VERSION);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

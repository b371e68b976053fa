//! Run one capture from parsed arguments.

use htmlshot_capture_engine::{
    get_backend, CaptureProgress, CaptureRequest, CaptureSession, SessionConfig, Viewport,
};
use htmlshot_common::config::{AppConfig, LoadedConfig};

use crate::Cli;

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let LoadedConfig {
        config,
        fallback_reason,
    } = match &cli.config {
        Some(path) => LoadedConfig {
            config: AppConfig::load_from(path)?,
            fallback_reason: None,
        },
        None => AppConfig::load(),
    };

    let logging = if cli.verbose {
        config.logging.verbose()
    } else {
        config.logging.clone()
    };
    htmlshot_common::logging::init_logging(&logging);

    if let Some(reason) = fallback_reason {
        tracing::warn!(%reason, "Failed to load config, using defaults");
    }

    let request = CaptureRequest {
        viewport: Viewport::new(
            cli.width.unwrap_or(config.capture.width),
            cli.height.unwrap_or(config.capture.height),
        ),
        filename: cli.filename,
        output_name: cli.output,
    };

    let backend = get_backend(&config.browser);
    let mut session = CaptureSession::new(SessionConfig::from(&config), backend)
        .with_progress(Box::new(print_progress));

    session.run(&request).await?;
    Ok(())
}

fn print_progress(progress: CaptureProgress) {
    match progress {
        CaptureProgress::Capturing { width, height } => println!("Capturing {width}x{height}"),
        CaptureProgress::Navigating { url } => println!("Opening {url}"),
        CaptureProgress::Saved { path, bytes } => {
            println!("Saved {} ({bytes} bytes)", path.display())
        }
    }
}

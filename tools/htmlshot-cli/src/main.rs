//! htmlshot CLI — render a local HTML file to a PNG screenshot.
//!
//! Usage:
//!   htmlshot <FILENAME> [--width N] [--height N] [--output NAME]
//!
//! Reads `html/<FILENAME>` and writes `imgs/<stem>/<NAME>`, appending
//! `_001`, `_002`, ... when the name is already taken.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

mod capture;

#[derive(Parser, Debug)]
#[command(
    name = "htmlshot",
    about = "Render an HTML file from ./html into a PNG under ./imgs",
    version,
    author
)]
struct Cli {
    /// HTML file name inside the input directory (e.g. draw.html)
    filename: String,

    /// Viewport width in pixels [default: 1080]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    width: Option<u32>,

    /// Viewport height in pixels [default: 1080]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    height: Option<u32>,

    /// Output file name [default: <stem>.png]
    #[arg(long)]
    output: Option<String>,

    /// Configuration file [default: $XDG_CONFIG_HOME/htmlshot/config.json]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = capture::run(cli).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Capture failed");
    }

    let (code, message) = exit_status(&result);
    if let Some(message) = message {
        println!("{message}");
    }
    ExitCode::from(code)
}

/// Exit code and the stdout line for a finished run. Every failure is
/// terminal and maps to 1.
fn exit_status(result: &anyhow::Result<()>) -> (u8, Option<String>) {
    match result {
        Ok(()) => (0, None),
        Err(e) => (1, Some(format!("Error: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use htmlshot_common::error::HtmlshotError;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults_leave_size_to_config() {
        let cli = Cli::try_parse_from(["htmlshot", "draw.html"]).unwrap();
        assert_eq!(cli.filename, "draw.html");
        assert_eq!(cli.width, None);
        assert_eq!(cli.height, None);
        assert_eq!(cli.output, None);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parses_geometry_and_output() {
        let cli = Cli::try_parse_from([
            "htmlshot",
            "draw.html",
            "--width",
            "200",
            "--height",
            "300",
            "--output",
            "custom.png",
        ])
        .unwrap();
        assert_eq!(cli.width, Some(200));
        assert_eq!(cli.height, Some(300));
        assert_eq!(cli.output.as_deref(), Some("custom.png"));
    }

    #[test]
    fn test_cli_rejects_zero_width() {
        assert!(Cli::try_parse_from(["htmlshot", "draw.html", "--width", "0"]).is_err());
    }

    #[test]
    fn test_exit_status_success() {
        assert_eq!(exit_status(&Ok(())), (0, None));
    }

    #[test]
    fn test_exit_status_missing_input() {
        let err = HtmlshotError::FileNotFound {
            path: PathBuf::from("html/missing.html"),
        };
        let (code, message) = exit_status(&Err(err.into()));
        assert_eq!(code, 1);
        assert_eq!(
            message.as_deref(),
            Some("Error: File not found: html/missing.html")
        );
    }

    #[test]
    fn test_exit_status_render_failure_keeps_cause() {
        let err = HtmlshotError::render("Navigation to file:///x failed: net::ERR_ABORTED");
        let (code, message) = exit_status(&Err(err.into()));
        assert_eq!(code, 1);
        assert!(message.unwrap().contains("net::ERR_ABORTED"));
    }

    #[test]
    fn test_cli_requires_filename() {
        assert!(Cli::try_parse_from(["htmlshot"]).is_err());
    }
}

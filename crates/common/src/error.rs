//! Error types shared across htmlshot crates.

use std::path::PathBuf;

/// Top-level error type for htmlshot operations.
#[derive(Debug, thiserror::Error)]
pub enum HtmlshotError {
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Failed to write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias using HtmlshotError.
pub type HtmlshotResult<T> = Result<T, HtmlshotError>;

impl HtmlshotError {
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Output {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_not_found_reports_path() {
        let err = HtmlshotError::FileNotFound {
            path: PathBuf::from("html/missing.html"),
        };
        assert_eq!(err.to_string(), "File not found: html/missing.html");
    }

    #[test]
    fn test_render_error_keeps_underlying_cause() {
        let err = HtmlshotError::render("net::ERR_FILE_NOT_FOUND");
        assert!(err.to_string().contains("net::ERR_FILE_NOT_FOUND"));
    }

    #[test]
    fn test_output_error_names_path_and_cause() {
        let err = HtmlshotError::output(
            "imgs/draw/draw.png",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        );
        let msg = err.to_string();
        assert!(msg.contains("imgs/draw/draw.png"));
        assert!(msg.contains("read-only"));
    }
}

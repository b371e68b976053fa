//! Capture session management.

use std::path::PathBuf;

use htmlshot_common::config::AppConfig;
use htmlshot_common::error::{HtmlshotError, HtmlshotResult};

use crate::backend::{BrowserSession, RenderBackend, Viewport};
use crate::paths;

/// Where inputs are read from and outputs written to.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Directory holding the HTML inputs.
    pub input_dir: PathBuf,

    /// Root directory for rendered images.
    pub output_dir: PathBuf,
}

impl From<&AppConfig> for SessionConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            input_dir: config.input_dir.clone(),
            output_dir: config.output_dir.clone(),
        }
    }
}

/// One conversion request, built once from the command line.
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    /// File name relative to the input directory.
    pub filename: String,

    /// Viewport the page is laid out at.
    pub viewport: Viewport,

    /// Output file name override. Defaults to `<stem>.png`.
    pub output_name: Option<String>,
}

/// State of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Session created, nothing attempted yet.
    Initialized,
    /// Browser is rendering the page.
    Rendering,
    /// Image written to disk.
    Written,
    /// A stage failed; the session cannot continue.
    Failed,
}

/// Progress notifications emitted while a capture runs.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureProgress {
    /// Capture starting at this viewport; emitted before the browser launches.
    Capturing { width: u32, height: u32 },
    /// About to navigate to the page.
    Navigating { url: String },
    /// Image persisted.
    Saved { path: PathBuf, bytes: usize },
}

/// Result of a successful capture.
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    /// Final output path.
    pub path: PathBuf,

    /// Number of bytes written.
    pub bytes: usize,
}

pub type ProgressCallback = Box<dyn Fn(CaptureProgress) + Send + Sync>;

/// Drives one HTML-to-PNG conversion from input resolution to file write.
pub struct CaptureSession {
    config: SessionConfig,
    backend: Box<dyn RenderBackend>,
    state: CaptureState,
    progress: Option<ProgressCallback>,
}

impl CaptureSession {
    /// Create a new capture session with the given configuration.
    pub fn new(config: SessionConfig, backend: Box<dyn RenderBackend>) -> Self {
        Self {
            config,
            backend,
            state: CaptureState::Initialized,
            progress: None,
        }
    }

    /// Register a callback that receives [`CaptureProgress`] updates.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Current session state.
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Run the whole pipeline for `request`.
    ///
    /// The input is checked before any browser is launched, and the output
    /// directory is only touched after rendering succeeded, so a failed run
    /// leaves the output tree as it was.
    pub async fn run(&mut self, request: &CaptureRequest) -> HtmlshotResult<CaptureOutcome> {
        if self.state != CaptureState::Initialized {
            return Err(HtmlshotError::render("Capture session already used"));
        }

        let result = self.run_stages(request).await;
        if result.is_err() {
            self.state = CaptureState::Failed;
        }
        result
    }

    async fn run_stages(&mut self, request: &CaptureRequest) -> HtmlshotResult<CaptureOutcome> {
        let input = paths::resolve_input(&self.config.input_dir, &request.filename)?;
        let stem = paths::input_stem(&input)?;
        let base_name = paths::output_base_name(&stem, request.output_name.as_deref())?;
        let url = paths::file_url(&input)?;

        tracing::info!(input = %input.display(), viewport = %request.viewport, "Starting capture");

        self.state = CaptureState::Rendering;
        let bytes = render(
            &*self.backend,
            &url,
            request.viewport,
            self.progress.as_ref(),
        )
        .await?;
        if bytes.is_empty() {
            return Err(HtmlshotError::render("Browser returned an empty screenshot"));
        }

        let dir = paths::output_dir(&self.config.output_dir, &stem);
        let path = paths::prepare_output(&dir, &base_name)?;
        paths::write_new(&path, &bytes)?;
        self.state = CaptureState::Written;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "Capture saved");
        self.emit(CaptureProgress::Saved {
            path: path.clone(),
            bytes: bytes.len(),
        });

        Ok(CaptureOutcome {
            path,
            bytes: bytes.len(),
        })
    }

    fn emit(&self, progress: CaptureProgress) {
        if let Some(callback) = &self.progress {
            callback(progress);
        }
    }
}

/// Render `url` at `viewport` and return the PNG bytes of the visible area.
///
/// The browser session is closed on every path out of this function.
pub async fn render(
    backend: &dyn RenderBackend,
    url: &str,
    viewport: Viewport,
    progress: Option<&ProgressCallback>,
) -> HtmlshotResult<Vec<u8>> {
    if let Some(callback) = progress {
        callback(CaptureProgress::Capturing {
            width: viewport.width,
            height: viewport.height,
        });
    }
    let mut browser = backend.launch().await?;

    let result = capture_page(&mut *browser, url, viewport, progress).await;

    if let Err(e) = browser.close().await {
        tracing::warn!(error = %e, "Failed to close browser session");
    }
    result
}

async fn capture_page(
    browser: &mut dyn BrowserSession,
    url: &str,
    viewport: Viewport,
    progress: Option<&ProgressCallback>,
) -> HtmlshotResult<Vec<u8>> {
    let mut page = browser.new_page(viewport).await?;

    tracing::debug!(%url, "Navigating");
    if let Some(callback) = progress {
        callback(CaptureProgress::Navigating {
            url: url.to_string(),
        });
    }
    page.goto(url).await?;
    page.wait_for_network_idle().await?;

    let bytes = page.screenshot().await?;
    tracing::debug!(bytes = bytes.len(), "Screenshot captured");
    Ok(bytes)
}

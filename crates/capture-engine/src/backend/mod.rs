use htmlshot_common::config::BrowserSettings;
use htmlshot_common::error::HtmlshotResult;

/// Visible rendering area in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Abstract interface for the browser engine that does the actual rendering.
#[async_trait::async_trait]
pub trait RenderBackend: Send + Sync {
    /// Start a fresh browser session.
    async fn launch(&self) -> HtmlshotResult<Box<dyn BrowserSession>>;
}

/// A running browser. Must be closed exactly once by its owner.
#[async_trait::async_trait]
pub trait BrowserSession: Send {
    /// Open a blank page laid out at the given viewport.
    async fn new_page(&mut self, viewport: Viewport) -> HtmlshotResult<Box<dyn RenderPage>>;

    /// Shut the browser down and release the child process.
    async fn close(&mut self) -> HtmlshotResult<()>;
}

/// A single page inside a [`BrowserSession`].
#[async_trait::async_trait]
pub trait RenderPage: Send {
    /// Navigate to `url`. Returns once the engine has committed the navigation.
    async fn goto(&mut self, url: &str) -> HtmlshotResult<()>;

    /// Suspend until the engine reports no in-flight network activity for
    /// the document loaded by the last [`RenderPage::goto`].
    async fn wait_for_network_idle(&mut self) -> HtmlshotResult<()>;

    /// Capture the visible viewport as PNG bytes.
    async fn screenshot(&mut self) -> HtmlshotResult<Vec<u8>>;
}

pub mod chromium;

pub use chromium::ChromiumBackend;

/// Get the default backend for the given browser settings.
pub fn get_backend(settings: &BrowserSettings) -> Box<dyn RenderBackend> {
    Box::new(ChromiumBackend::new(settings.clone()))
}

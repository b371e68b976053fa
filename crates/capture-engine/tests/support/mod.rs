//! Scripted stand-in for the browser engine.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use htmlshot_capture_engine::{BrowserSession, RenderBackend, RenderPage, Viewport};
use htmlshot_common::error::{HtmlshotError, HtmlshotResult};

/// Minimal PNG signature; the pipeline treats bytes as opaque.
pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Launch,
    Navigation,
    Screenshot,
}

#[derive(Debug, Default)]
pub struct Calls {
    pub launches: usize,
    pub viewports: Vec<Viewport>,
    pub urls: Vec<String>,
    pub idle_waits: usize,
    pub closes: usize,
}

#[derive(Clone)]
pub struct FakeBackend {
    pub calls: Arc<Mutex<Calls>>,
    fail_at: Option<FailAt>,
    image: Vec<u8>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Calls::default())),
            fail_at: None,
            image: FAKE_PNG.to_vec(),
        }
    }

    pub fn failing_at(stage: FailAt) -> Self {
        Self {
            fail_at: Some(stage),
            ..Self::new()
        }
    }

    pub fn returning(image: Vec<u8>) -> Self {
        Self {
            image,
            ..Self::new()
        }
    }
}

#[async_trait::async_trait]
impl RenderBackend for FakeBackend {
    async fn launch(&self) -> HtmlshotResult<Box<dyn BrowserSession>> {
        self.calls.lock().unwrap().launches += 1;
        if self.fail_at == Some(FailAt::Launch) {
            return Err(HtmlshotError::render("Failed to launch browser: no chrome"));
        }
        Ok(Box::new(FakeSession {
            backend: self.clone(),
        }))
    }
}

struct FakeSession {
    backend: FakeBackend,
}

#[async_trait::async_trait]
impl BrowserSession for FakeSession {
    async fn new_page(&mut self, viewport: Viewport) -> HtmlshotResult<Box<dyn RenderPage>> {
        self.backend.calls.lock().unwrap().viewports.push(viewport);
        Ok(Box::new(FakePage {
            backend: self.backend.clone(),
        }))
    }

    async fn close(&mut self) -> HtmlshotResult<()> {
        self.backend.calls.lock().unwrap().closes += 1;
        Ok(())
    }
}

struct FakePage {
    backend: FakeBackend,
}

#[async_trait::async_trait]
impl RenderPage for FakePage {
    async fn goto(&mut self, url: &str) -> HtmlshotResult<()> {
        self.backend.calls.lock().unwrap().urls.push(url.to_string());
        if self.backend.fail_at == Some(FailAt::Navigation) {
            return Err(HtmlshotError::render(format!(
                "Navigation to {url} failed: net::ERR_ABORTED"
            )));
        }
        Ok(())
    }

    async fn wait_for_network_idle(&mut self) -> HtmlshotResult<()> {
        self.backend.calls.lock().unwrap().idle_waits += 1;
        Ok(())
    }

    async fn screenshot(&mut self) -> HtmlshotResult<Vec<u8>> {
        if self.backend.fail_at == Some(FailAt::Screenshot) {
            return Err(HtmlshotError::render("Screenshot failed: target crashed"));
        }
        Ok(self.backend.image.clone())
    }
}

/// Scratch working tree with `html/` and an (absent) `imgs/`.
pub struct Workspace {
    pub root: PathBuf,
}

impl Workspace {
    pub fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(root.join("html")).unwrap();
        Self { root }
    }

    pub fn with_page(self, filename: &str) -> Self {
        std::fs::write(
            self.root.join("html").join(filename),
            "<html><body><h1>hello</h1></body></html>",
        )
        .unwrap();
        self
    }

    pub fn input_dir(&self) -> PathBuf {
        self.root.join("html")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join("imgs")
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.root).ok();
    }
}

//! Chromium backend speaking the DevTools protocol through `chromiumoxide`.

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::LoaderId;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, EventLifecycleEvent, FrameId, NavigateParams,
    SetLifecycleEventsEnabledParams,
};
use chromiumoxide::handler::viewport::Viewport as CdpViewport;
use chromiumoxide::listeners::EventStream;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use htmlshot_common::config::BrowserSettings;
use htmlshot_common::error::{HtmlshotError, HtmlshotResult};
use tokio::task::JoinHandle;

use super::{BrowserSession, RenderBackend, RenderPage, Viewport};

/// Name of the lifecycle event Chromium fires once no request has been in
/// flight for 500ms.
const NETWORK_IDLE: &str = "networkIdle";

/// Launches a local Chrome/Chromium per session.
pub struct ChromiumBackend {
    settings: BrowserSettings,
}

impl ChromiumBackend {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    fn browser_config(&self) -> HtmlshotResult<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(self.settings.request_timeout())
            // Viewport is set per page through device metrics.
            .viewport(None::<CdpViewport>);

        if let Some(executable) = &self.settings.executable {
            builder = builder.chrome_executable(executable);
        }
        if !self.settings.headless {
            builder = builder.with_head();
        }
        if !self.settings.sandbox {
            builder = builder.no_sandbox();
        }
        if !self.settings.args.is_empty() {
            builder = builder.args(self.settings.args.iter().cloned());
        }

        builder
            .build()
            .map_err(|e| HtmlshotError::render(format!("Invalid browser configuration: {e}")))
    }
}

#[async_trait::async_trait]
impl RenderBackend for ChromiumBackend {
    async fn launch(&self) -> HtmlshotResult<Box<dyn BrowserSession>> {
        let config = self.browser_config()?;

        tracing::debug!(
            headless = self.settings.headless,
            sandbox = self.settings.sandbox,
            "Launching browser"
        );
        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            HtmlshotError::render(format!(
                "Failed to launch browser: {e} (set browser.executable in the config file if Chrome is not on PATH)"
            ))
        })?;

        // The CDP connection only makes progress while its handler is polled.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!(error = %e, "CDP handler event error");
                }
            }
        });

        Ok(Box::new(ChromiumSession {
            browser: Some(browser),
            handler_task: Some(handler_task),
            load_timeout: self.settings.load_timeout(),
        }))
    }
}

struct ChromiumSession {
    browser: Option<Browser>,
    handler_task: Option<JoinHandle<()>>,
    load_timeout: Duration,
}

#[async_trait::async_trait]
impl BrowserSession for ChromiumSession {
    async fn new_page(&mut self, viewport: Viewport) -> HtmlshotResult<Box<dyn RenderPage>> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| HtmlshotError::render("Browser session already closed"))?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| HtmlshotError::render(format!("Failed to open page: {e}")))?;

        page.execute(SetDeviceMetricsOverrideParams::new(
            viewport.width,
            viewport.height,
            1.0,
            false,
        ))
        .await
        .map_err(|e| HtmlshotError::render(format!("Failed to set viewport {viewport}: {e}")))?;

        page.execute(SetLifecycleEventsEnabledParams::new(true))
            .await
            .map_err(|e| {
                HtmlshotError::render(format!("Failed to enable lifecycle events: {e}"))
            })?;

        // Subscribe before navigating so no lifecycle event can be missed.
        let lifecycle = page
            .event_listener::<EventLifecycleEvent>()
            .await
            .map_err(|e| HtmlshotError::render(format!("Failed to subscribe to page events: {e}")))?;

        Ok(Box::new(ChromiumPage {
            page,
            lifecycle,
            navigation: None,
            load_timeout: self.load_timeout,
        }))
    }

    async fn close(&mut self) -> HtmlshotResult<()> {
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };

        let closed = browser.close().await;
        if let Err(e) = browser.wait().await {
            tracing::debug!(error = %e, "Browser process did not exit cleanly");
        }
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }

        closed
            .map(|_| ())
            .map_err(|e| HtmlshotError::render(format!("Failed to close browser: {e}")))
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
    }
}

/// Frame and document produced by the last navigation.
#[derive(Debug, Clone)]
struct Navigation {
    frame_id: FrameId,
    loader_id: Option<LoaderId>,
}

struct ChromiumPage {
    page: Page,
    lifecycle: EventStream<EventLifecycleEvent>,
    navigation: Option<Navigation>,
    load_timeout: Duration,
}

#[async_trait::async_trait]
impl RenderPage for ChromiumPage {
    async fn goto(&mut self, url: &str) -> HtmlshotResult<()> {
        let response = self
            .page
            .execute(NavigateParams::new(url))
            .await
            .map_err(|e| HtmlshotError::render(format!("Navigation to {url} failed: {e}")))?;
        let result = response.result;

        if let Some(error_text) = result.error_text {
            return Err(HtmlshotError::render(format!(
                "Navigation to {url} failed: {error_text}"
            )));
        }

        self.navigation = Some(Navigation {
            frame_id: result.frame_id,
            loader_id: result.loader_id,
        });
        Ok(())
    }

    async fn wait_for_network_idle(&mut self) -> HtmlshotResult<()> {
        let Some(target) = self.navigation.clone() else {
            return Err(HtmlshotError::render("No navigation to wait for"));
        };

        let lifecycle = &mut self.lifecycle;
        let wait = async move {
            while let Some(event) = lifecycle.next().await {
                if event.frame_id != target.frame_id {
                    continue;
                }
                if let Some(loader_id) = &target.loader_id {
                    if &event.loader_id != loader_id {
                        continue;
                    }
                }
                tracing::trace!(name = %event.name, "Lifecycle event");
                if event.name == NETWORK_IDLE {
                    return Ok(());
                }
            }
            Err(HtmlshotError::render(
                "Browser connection closed before the page went idle",
            ))
        };

        match tokio::time::timeout(self.load_timeout, wait).await {
            Ok(result) => result,
            Err(_) => Err(HtmlshotError::render(format!(
                "Timed out after {}s waiting for network idle",
                self.load_timeout.as_secs()
            ))),
        }
    }

    async fn screenshot(&mut self) -> HtmlshotResult<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(false)
            .build();

        self.page
            .screenshot(params)
            .await
            .map_err(|e| HtmlshotError::render(format!("Screenshot failed: {e}")))
    }
}

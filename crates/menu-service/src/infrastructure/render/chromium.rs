//! Chromium-backed [`BrowserLauncher`] using the DevTools protocol.
//!
//! One headless Chromium process is started per [`ChromiumLauncher::launch`].
//! Each capture opens its own browser context (the CDP equivalent of an
//! incognito window), so pages never share cookies or storage, and the
//! context is disposed after the screenshot is written.

use std::path::PathBuf;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, BrowserConfig};
use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{BrowserLauncher, BrowserSession, CaptureRequest, RenderError};

/// Launches headless Chromium.
#[derive(Debug, Clone, Default)]
pub struct ChromiumLauncher {
    executable: Option<PathBuf>,
}

impl ChromiumLauncher {
    /// `executable` overrides browser discovery; `None` lets chromiumoxide
    /// search the usual install locations.
    pub fn new(executable: Option<PathBuf>) -> Self {
        Self { executable }
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, RenderError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-dev-shm-usage");
        if let Some(executable) = &self.executable {
            builder = builder.chrome_executable(executable);
        }
        let config = builder.build().map_err(RenderError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        // The handler drives the CDP connection and must be polled for the
        // browser to make progress.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser handler event error: {e}");
                }
            }
        });

        info!("headless Chromium launched");
        Ok(Box::new(ChromiumSession {
            browser,
            handler_task,
        }))
    }
}

/// A running Chromium process plus the task polling its connection.
struct ChromiumSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

fn cdp_error(e: impl std::fmt::Display) -> RenderError {
    RenderError::Capture(e.to_string())
}

impl ChromiumSession {
    async fn capture_in_context(
        &self,
        context_id: BrowserContextId,
        request: &CaptureRequest<'_>,
    ) -> Result<(), RenderError> {
        let target = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context_id)
            .build()
            .map_err(RenderError::Capture)?;
        let page = self.browser.new_page(target).await.map_err(cdp_error)?;

        page.execute(SetDeviceMetricsOverrideParams::new(
            i64::from(request.width),
            i64::from(request.height),
            1.0,
            false,
        ))
        .await
        .map_err(cdp_error)?;

        page.set_content(request.html).await.map_err(cdp_error)?;
        tokio::time::sleep(request.settle_delay).await;

        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        let captured = page.save_screenshot(params, request.output).await;

        if let Err(e) = page.close().await {
            debug!("failed to close page: {e}");
        }
        captured.map(|_| ()).map_err(cdp_error)
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn capture(&self, request: &CaptureRequest<'_>) -> Result<(), RenderError> {
        let context = self
            .browser
            .execute(CreateBrowserContextParams::default())
            .await
            .map_err(cdp_error)?;
        let context_id = context.result.browser_context_id.clone();

        let result = self.capture_in_context(context_id.clone(), request).await;

        if let Err(e) = self
            .browser
            .execute(DisposeBrowserContextParams::new(context_id))
            .await
        {
            warn!("failed to dispose browser context: {e}");
        }
        result
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        let closed = self.browser.close().await.map(|_| ()).map_err(cdp_error);
        if let Err(e) = self.browser.wait().await {
            debug!("failed to reap browser process: {e}");
        }
        self.handler_task.abort();
        closed
    }
}

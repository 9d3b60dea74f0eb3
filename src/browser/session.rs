use crate::browser::config::{ConnectionOptions, LaunchOptions};
use crate::dom::DomTree;
use crate::error::{InventoryError, Result};
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, Tab};
use std::{sync::Arc, time::Duration};

/// A Chrome/Chromium instance with the tab used for inspection
pub struct BrowserSession {
    /// Keeps the browser process (or connection) alive
    _browser: Browser,

    tab: Arc<Tab>,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // A slow page must not outlive the default 30s idle timeout
        launch_opts.idle_browser_timeout = Duration::from_secs(10 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));
        launch_opts.sandbox = options.sandbox;

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }

        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        let browser = Browser::new(launch_opts).map_err(|e| InventoryError::LaunchFailed(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| InventoryError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        Ok(Self { _browser: browser, tab })
    }

    /// Connect to an existing browser instance via WebSocket
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect_with_timeout(options.ws_url, Duration::from_millis(options.timeout))
            .map_err(|e| InventoryError::ConnectionFailed(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| InventoryError::TabOperationFailed(format!("Failed to create tab: {}", e)))?;

        Ok(Self { _browser: browser, tab })
    }

    /// Open a URL and wait until the navigation completes
    pub fn navigate(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| InventoryError::NavigationFailed(format!("Failed to open {}: {}", url, e)))?
            .wait_until_navigated()
            .map_err(|e| InventoryError::NavigationFailed(format!("Navigation to {} did not complete: {}", url, e)))?;

        log::info!("Opened {}", url);
        Ok(())
    }

    /// Capture the element tree of the current page
    pub fn snapshot(&self) -> Result<DomTree> {
        DomTree::from_tab(&self.tab)
    }

    /// Capture the viewport as PNG
    pub fn screenshot(&self) -> Result<Vec<u8>> {
        self.tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| InventoryError::TabOperationFailed(format!("Failed to capture screenshot: {}", e)))
    }

    /// Close the inspection tab; the browser exits when the session is dropped
    pub fn close(&self) -> Result<()> {
        self.tab
            .close(false)
            .map_err(|e| InventoryError::TabOperationFailed(format!("Failed to close tab: {}", e)))?;
        Ok(())
    }
}

//! Render session
//!
//! Owns the single browser process shared by every request and turns a URL
//! into a [`RenderResult`]. Each render attempt gets its own page context
//! which is closed on every exit path.

use crate::backend::{Browser, BrowserLauncher, PageContext, PageGuard};
use crate::config::RenderConfig;
use crate::error::{BackendError, RenderError, Stage};
use pagesift_domain::RenderResult;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Shared browser plus the per-request render procedure
pub struct RenderSession<L: BrowserLauncher> {
    launcher: Arc<L>,
    config: RenderConfig,
    browser: Mutex<Option<Arc<L::Browser>>>,
}

impl<L: BrowserLauncher> RenderSession<L> {
    /// Create a session. No browser is started until first use.
    pub fn new(launcher: L, config: RenderConfig) -> Self {
        Self {
            launcher: Arc::new(launcher),
            config,
            browser: Mutex::new(None),
        }
    }

    /// Session configuration
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Whether a live browser is currently held
    pub async fn is_ready(&self) -> bool {
        let cached = self.browser.lock().await.clone();
        match cached {
            Some(browser) => check_alive(browser).await,
            None => false,
        }
    }

    /// Start the browser if none is running, or replace one that died.
    ///
    /// Concurrent callers wait on the same lock, so at most one launch is in
    /// flight at a time.
    pub async fn ensure_ready(&self) -> Result<(), RenderError> {
        self.browser_handle().await.map(|_| ())
    }

    async fn browser_handle(&self) -> Result<Arc<L::Browser>, RenderError> {
        // The liveness check blocks on the browser, so it runs without the lock held.
        let cached = self.browser.lock().await.clone();
        let stale = match cached {
            Some(browser) => {
                if check_alive(Arc::clone(&browser)).await {
                    return Ok(browser);
                }
                Some(browser)
            }
            None => None,
        };

        let mut guard = self.browser.lock().await;
        if let Some(stale) = stale {
            if guard.as_ref().is_some_and(|current| Arc::ptr_eq(current, &stale)) {
                warn!("browser process is no longer responding, relaunching");
                *guard = None;
            }
        }
        // Another caller may have launched while this one waited for the lock.
        if let Some(browser) = guard.as_ref() {
            return Ok(Arc::clone(browser));
        }

        let launcher = Arc::clone(&self.launcher);
        let launched = tokio::task::spawn_blocking(move || launcher.launch())
            .await
            .map_err(|e| RenderError::Initialization(format!("launch task failed: {}", e)))?
            .map_err(|e| RenderError::classify(Stage::Launch, e, "", 0))?;

        info!("browser started");
        let browser = Arc::new(launched);
        *guard = Some(Arc::clone(&browser));
        Ok(browser)
    }

    /// Render a URL into HTML plus visible text.
    ///
    /// Retryable failures are retried up to `max_attempts` in total with
    /// `retry_delay` between attempts. The error from the final attempt is
    /// returned when all attempts fail.
    pub async fn load(&self, url: &str) -> Result<RenderResult, RenderError> {
        let started = Instant::now();
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let result = self.attempt(url).await;

            match result {
                Ok(page) => {
                    info!(
                        url,
                        attempt,
                        html_len = page.html_len(),
                        text_len = page.text_len(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "page rendered"
                    );
                    return Ok(page);
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    warn!(url, attempt, error = %e, "render attempt failed, retrying");
                    tokio::time::sleep(self.config.retry_delay()).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(url, attempt, error = %e, "render failed");
                    return Err(e);
                }
            }
        }
    }

    async fn attempt(&self, url: &str) -> Result<RenderResult, RenderError> {
        let browser = self.browser_handle().await?;
        let config = self.config.clone();
        let target = url.to_string();

        tokio::task::spawn_blocking(move || render_once(browser.as_ref(), &config, &target))
            .await
            .map_err(|e| RenderError::Runtime(format!("render task failed: {}", e)))?
    }

    /// Close the browser process. Later calls to `load` start a new one.
    pub async fn shutdown(&self) {
        let taken = self.browser.lock().await.take();
        if taken.is_some() {
            info!("browser released");
        }
    }
}

/// One render attempt on a fresh page context
async fn check_alive<B: Browser>(browser: Arc<B>) -> bool {
    tokio::task::spawn_blocking(move || browser.is_alive())
        .await
        .unwrap_or(false)
}

fn render_once<B: Browser>(
    browser: &B,
    config: &RenderConfig,
    url: &str,
) -> Result<RenderResult, RenderError> {
    let timeout_ms = config.navigation_timeout_ms;
    let classify = |stage: Stage| move |e: BackendError| RenderError::classify(stage, e, url, timeout_ms);

    let page = PageGuard::new(browser.open_page().map_err(classify(Stage::Open))?);

    page.prepare(config.viewport, &config.resource_policy)
        .map_err(classify(Stage::Prepare))?;

    page.navigate(url, config.navigation_timeout())
        .map_err(classify(Stage::Navigate))?;

    if let Err(e) = page.wait_for_element(&config.ready_selector, config.settle_timeout()) {
        debug!(url, selector = %config.ready_selector, error = %e, "ready element not found, continuing");
    }

    if !config.settle_delay().is_zero() {
        std::thread::sleep(config.settle_delay());
    }

    let html = page.content().map_err(classify(Stage::Extract))?;
    let text = page.inner_text().map_err(classify(Stage::Extract))?;
    let result = RenderResult::new(html, text);

    if result.html_len() < config.min_html_chars {
        return Err(RenderError::EmptyPage {
            url: url.to_string(),
            html_len: result.html_len(),
        });
    }

    if result.text_len() < config.min_text_chars {
        warn!(url, text_len = result.text_len(), "rendered page has very little visible text");
    }

    Ok(result)
}

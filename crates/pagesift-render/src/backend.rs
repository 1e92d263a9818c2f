//! Browser backend traits
//!
//! The session drives a browser through these three traits. Calls are
//! blocking; the session runs them on the blocking thread pool so the async
//! runtime is never stalled by DevTools round-trips.

use crate::config::Viewport;
use crate::error::BackendError;
use crate::policy::ResourcePolicy;
use std::ops::Deref;
use std::time::Duration;
use tracing::warn;

/// Starts browser processes
pub trait BrowserLauncher: Send + Sync + 'static {
    /// Running browser produced by this launcher
    type Browser: Browser;

    /// Start a browser process
    fn launch(&self) -> Result<Self::Browser, BackendError>;
}

/// A running browser process shared by all requests
pub trait Browser: Send + Sync + 'static {
    /// Page context type
    type Page: PageContext;

    /// Open a new, isolated page context
    fn open_page(&self) -> Result<Self::Page, BackendError>;

    /// Whether the process still answers DevTools requests
    fn is_alive(&self) -> bool;
}

/// A short-lived page context owned by a single render attempt
pub trait PageContext: Send + 'static {
    /// Install anti-detection measures, the viewport and the resource policy
    fn prepare(&self, viewport: Viewport, policy: &ResourcePolicy) -> Result<(), BackendError>;

    /// Navigate and wait until the network is idle, bounded by `timeout`
    fn navigate(&self, url: &str, timeout: Duration) -> Result<(), BackendError>;

    /// Wait for an element matching `selector` to be attached
    fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<(), BackendError>;

    /// Full serialized HTML
    fn content(&self) -> Result<String, BackendError>;

    /// Visible inner text of the body
    fn inner_text(&self) -> Result<String, BackendError>;

    /// Release the page context
    fn close(&self) -> Result<(), BackendError>;
}

/// Owns a page context and closes it exactly once when dropped.
///
/// Dropping happens on every exit path of a render attempt, including early
/// returns and panics.
pub(crate) struct PageGuard<P: PageContext> {
    page: P,
}

impl<P: PageContext> PageGuard<P> {
    pub(crate) fn new(page: P) -> Self {
        Self { page }
    }
}

impl<P: PageContext> Deref for PageGuard<P> {
    type Target = P;

    fn deref(&self) -> &P {
        &self.page
    }
}

impl<P: PageContext> Drop for PageGuard<P> {
    fn drop(&mut self) {
        if let Err(e) = self.page.close() {
            warn!(error = %e, "failed to close page context");
        }
    }
}

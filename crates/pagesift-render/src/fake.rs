//! Scripted in-memory browser backend
//!
//! Used by tests in this crate and downstream crates to drive the render
//! session without a Chromium installation. Each opened page consumes the
//! next scripted [`FakeOutcome`]; when the script is empty a default page is
//! served.

use crate::backend::{Browser, BrowserLauncher, PageContext};
use crate::config::Viewport;
use crate::error::BackendError;
use crate::policy::ResourcePolicy;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// What a single render attempt sees
#[derive(Debug, Clone)]
pub enum FakeOutcome {
    /// Navigation succeeds and the page has this content
    Page {
        /// Serialized HTML
        html: String,
        /// Visible text
        text: String,
    },
    /// Navigation does not reach network idle in time
    NavigationTimeout,
    /// Navigation fails outright (DNS, refused connection, ...)
    NavigationFailure(String),
    /// Navigation succeeds but reading the page fails
    ExtractionFailure(String),
    /// Navigation succeeds, the ready element never appears
    NoReadyElement {
        /// Serialized HTML
        html: String,
        /// Visible text
        text: String,
    },
    /// The backend panics during navigation
    Panic(String),
    /// Navigation blocks for `delay`, then the page has this content
    Slow {
        /// Time spent inside navigate
        delay: Duration,
        /// Serialized HTML
        html: String,
        /// Visible text
        text: String,
    },
}

impl FakeOutcome {
    /// A page whose HTML wraps `text` in a body
    pub fn page(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::Page {
            html: format!("<html><head><title>fake</title></head><body><main>{}</main></body></html>", text),
            text,
        }
    }
}

fn default_page() -> FakeOutcome {
    FakeOutcome::page(
        "Example Domain. This domain is for use in illustrative examples in documents. \
         You may use this domain in literature without prior coordination or asking for permission.",
    )
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct FakeState {
    launches: AtomicUsize,
    pages_opened: AtomicUsize,
    pages_closed: AtomicUsize,
    fail_launch: AtomicBool,
    alive: AtomicBool,
    launch_delay: Mutex<Duration>,
    liveness_delay: Mutex<Duration>,
    script: Mutex<VecDeque<FakeOutcome>>,
    visited: Mutex<Vec<String>>,
    last_policy: Mutex<Option<ResourcePolicy>>,
    last_viewport: Mutex<Option<Viewport>>,
}

/// Launcher for the scripted backend. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct FakeLauncher {
    state: Arc<FakeState>,
}

impl FakeLauncher {
    /// Create a launcher with an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome of the next render attempt
    pub fn push(&self, outcome: FakeOutcome) -> &Self {
        lock(&self.state.script).push_back(outcome);
        self
    }

    /// Make every launch fail
    pub fn fail_launches(&self) -> &Self {
        self.state.fail_launch.store(true, Ordering::SeqCst);
        self
    }

    /// Sleep this long inside each launch
    pub fn with_launch_delay(self, delay: Duration) -> Self {
        *lock(&self.state.launch_delay) = delay;
        self
    }

    /// Sleep this long inside each liveness check
    pub fn with_liveness_delay(self, delay: Duration) -> Self {
        *lock(&self.state.liveness_delay) = delay;
        self
    }

    /// Simulate the browser process dying
    pub fn kill_browser(&self) {
        self.state.alive.store(false, Ordering::SeqCst);
    }

    /// Number of successful launches
    pub fn launches(&self) -> usize {
        self.state.launches.load(Ordering::SeqCst)
    }

    /// Number of page contexts opened
    pub fn pages_opened(&self) -> usize {
        self.state.pages_opened.load(Ordering::SeqCst)
    }

    /// Number of page contexts closed
    pub fn pages_closed(&self) -> usize {
        self.state.pages_closed.load(Ordering::SeqCst)
    }

    /// URLs passed to navigate, in order
    pub fn visited(&self) -> Vec<String> {
        lock(&self.state.visited).clone()
    }

    /// Resource policy installed on the most recent page
    pub fn last_policy(&self) -> Option<ResourcePolicy> {
        lock(&self.state.last_policy).clone()
    }

    /// Viewport installed on the most recent page
    pub fn last_viewport(&self) -> Option<Viewport> {
        *lock(&self.state.last_viewport)
    }
}

impl BrowserLauncher for FakeLauncher {
    type Browser = FakeBrowser;

    fn launch(&self) -> Result<FakeBrowser, BackendError> {
        let delay = *lock(&self.state.launch_delay);
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        if self.state.fail_launch.load(Ordering::SeqCst) {
            return Err(BackendError::Failed("no chromium executable found".to_string()));
        }
        self.state.launches.fetch_add(1, Ordering::SeqCst);
        self.state.alive.store(true, Ordering::SeqCst);
        Ok(FakeBrowser {
            state: Arc::clone(&self.state),
        })
    }
}

/// Browser handle of the scripted backend
#[derive(Debug)]
pub struct FakeBrowser {
    state: Arc<FakeState>,
}

impl Browser for FakeBrowser {
    type Page = FakePage;

    fn open_page(&self) -> Result<FakePage, BackendError> {
        let outcome = lock(&self.state.script).pop_front().unwrap_or_else(default_page);
        self.state.pages_opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakePage {
            state: Arc::clone(&self.state),
            outcome,
        })
    }

    fn is_alive(&self) -> bool {
        let delay = *lock(&self.state.liveness_delay);
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        self.state.alive.load(Ordering::SeqCst)
    }
}

/// Page context of the scripted backend
#[derive(Debug)]
pub struct FakePage {
    state: Arc<FakeState>,
    outcome: FakeOutcome,
}

impl PageContext for FakePage {
    fn prepare(&self, viewport: Viewport, policy: &ResourcePolicy) -> Result<(), BackendError> {
        *lock(&self.state.last_viewport) = Some(viewport);
        *lock(&self.state.last_policy) = Some(policy.clone());
        Ok(())
    }

    fn navigate(&self, url: &str, timeout: Duration) -> Result<(), BackendError> {
        lock(&self.state.visited).push(url.to_string());
        match &self.outcome {
            FakeOutcome::NavigationTimeout => Err(BackendError::Timeout(format!(
                "network not idle after {}ms",
                timeout.as_millis()
            ))),
            FakeOutcome::NavigationFailure(reason) => Err(BackendError::Failed(reason.clone())),
            FakeOutcome::Panic(message) => panic!("{}", message),
            FakeOutcome::Slow { delay, .. } => {
                std::thread::sleep(*delay);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn wait_for_element(&self, selector: &str, _timeout: Duration) -> Result<(), BackendError> {
        match &self.outcome {
            FakeOutcome::NoReadyElement { .. } => {
                Err(BackendError::Timeout(format!("no element matches {}", selector)))
            }
            _ => Ok(()),
        }
    }

    fn content(&self) -> Result<String, BackendError> {
        match &self.outcome {
            FakeOutcome::Page { html, .. }
            | FakeOutcome::NoReadyElement { html, .. }
            | FakeOutcome::Slow { html, .. } => {
                Ok(html.clone())
            }
            FakeOutcome::ExtractionFailure(reason) => Err(BackendError::Failed(reason.clone())),
            _ => Err(BackendError::Failed("page was never loaded".to_string())),
        }
    }

    fn inner_text(&self) -> Result<String, BackendError> {
        match &self.outcome {
            FakeOutcome::Page { text, .. }
            | FakeOutcome::NoReadyElement { text, .. }
            | FakeOutcome::Slow { text, .. } => {
                Ok(text.clone())
            }
            FakeOutcome::ExtractionFailure(reason) => Err(BackendError::Failed(reason.clone())),
            _ => Err(BackendError::Failed("page was never loaded".to_string())),
        }
    }

    fn close(&self) -> Result<(), BackendError> {
        self.state.pages_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

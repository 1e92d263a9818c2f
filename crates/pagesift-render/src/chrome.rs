//! Headless Chromium backend
//!
//! Drives a local Chromium over the DevTools protocol with `headless_chrome`.
//! Each page context is a fresh tab with request interception enabled so
//! blocked resource kinds never hit the network.

use crate::backend::{Browser, BrowserLauncher, PageContext};
use crate::config::{LaunchConfig, Viewport};
use crate::error::BackendError;
use crate::policy::{ResourceKind, ResourcePolicy};
use headless_chrome::browser::tab::RequestPausedDecision;
use headless_chrome::browser::transport::{SessionId, Transport};
use headless_chrome::protocol::cdp::types::Event;
use headless_chrome::protocol::cdp::Fetch::events::RequestPausedEvent;
use headless_chrome::protocol::cdp::Fetch::{FailRequest, RequestPattern, RequestStage};
use headless_chrome::protocol::cdp::Network::{ErrorReason, ResourceType};
use headless_chrome::protocol::cdp::Page;
use headless_chrome::types::Bounds;
use headless_chrome::util::Timeout;
use headless_chrome::{Browser as HeadlessBrowser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Lifecycle event Chromium emits once at most two connections have been
/// in flight for 500ms.
const NETWORK_IDLE_EVENT: &str = "networkAlmostIdle";

const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs before any page script and hides common automation fingerprints.
const STEALTH_SCRIPT: &str = r#"
Object.defineProperty(navigator, 'webdriver', { get: () => undefined, configurable: true });
Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3] });
window.chrome = window.chrome || { runtime: {} };
"#;

const INNER_TEXT_SCRIPT: &str = "document.body ? document.body.innerText : ''";

fn backend_error(err: anyhow::Error) -> BackendError {
    if err.downcast_ref::<Timeout>().is_some() {
        BackendError::Timeout(err.to_string())
    } else {
        BackendError::Failed(err.to_string())
    }
}

/// A lifecycle milestone reached by one document load in one frame
#[derive(Debug, Clone, PartialEq, Eq)]
struct LoaderMark {
    frame_id: String,
    loader_id: String,
}

/// Keep only network-idle events; other lifecycle names are ignored.
fn idle_mark(name: &str, frame_id: &str, loader_id: &str) -> Option<LoaderMark> {
    (name == NETWORK_IDLE_EVENT).then(|| LoaderMark {
        frame_id: frame_id.to_string(),
        loader_id: loader_id.to_string(),
    })
}

/// Whether the load started by navigate in `frame_id` has gone idle.
/// Marks from subframes and from earlier documents do not count.
fn reached_idle(marks: &[LoaderMark], frame_id: &str, loader_id: &str) -> bool {
    marks
        .iter()
        .any(|mark| mark.frame_id == frame_id && mark.loader_id == loader_id)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn resource_kind(resource_type: &ResourceType) -> ResourceKind {
    match resource_type {
        ResourceType::Document => ResourceKind::Document,
        ResourceType::Stylesheet => ResourceKind::Stylesheet,
        ResourceType::Image => ResourceKind::Image,
        ResourceType::Media => ResourceKind::Media,
        ResourceType::Font => ResourceKind::Font,
        ResourceType::Script => ResourceKind::Script,
        _ => ResourceKind::Other,
    }
}

/// Launches a local Chromium process
#[derive(Debug, Clone, Default)]
pub struct ChromeLauncher {
    config: LaunchConfig,
}

impl ChromeLauncher {
    /// Create a launcher with the given launch settings
    pub fn new(config: LaunchConfig) -> Self {
        Self { config }
    }
}

impl BrowserLauncher for ChromeLauncher {
    type Browser = ChromeBrowser;

    fn launch(&self) -> Result<ChromeBrowser, BackendError> {
        let args = self.config.effective_args();
        let options = LaunchOptions::default_builder()
            .headless(self.config.headless)
            .sandbox(self.config.sandbox)
            .window_size(Some((self.config.window.width, self.config.window.height)))
            .idle_browser_timeout(self.config.idle_browser_timeout())
            .args(args.iter().map(OsStr::new).collect())
            .build()
            .map_err(|e| BackendError::Failed(format!("invalid launch options: {}", e)))?;

        let inner = HeadlessBrowser::new(options).map_err(backend_error)?;
        debug!(headless = self.config.headless, "chromium launched");
        Ok(ChromeBrowser { inner })
    }
}

/// A running Chromium process
pub struct ChromeBrowser {
    inner: HeadlessBrowser,
}

impl std::fmt::Debug for ChromeBrowser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromeBrowser").finish()
    }
}

impl Browser for ChromeBrowser {
    type Page = ChromePage;

    fn open_page(&self) -> Result<ChromePage, BackendError> {
        let tab = self.inner.new_tab().map_err(backend_error)?;
        Ok(ChromePage {
            tab,
            idle_marks: Arc::new(Mutex::new(Vec::new())),
        })
    }

    fn is_alive(&self) -> bool {
        self.inner.get_version().is_ok()
    }
}

/// One Chromium tab
pub struct ChromePage {
    tab: Arc<Tab>,
    idle_marks: Arc<Mutex<Vec<LoaderMark>>>,
}

impl std::fmt::Debug for ChromePage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromePage").finish()
    }
}

impl ChromePage {
    fn install_resource_policy(&self, policy: &ResourcePolicy) -> Result<(), BackendError> {
        let patterns = [RequestPattern {
            url_pattern: Some("*".to_string()),
            resource_Type: None,
            request_stage: Some(RequestStage::Request),
        }];
        self.tab
            .enable_fetch(Some(&patterns), None)
            .map_err(backend_error)?;

        let policy = policy.clone();
        self.tab
            .enable_request_interception(Arc::new(
                move |_transport: Arc<Transport>,
                      _session_id: SessionId,
                      intercepted: RequestPausedEvent| {
                    let kind = resource_kind(&intercepted.params.resource_Type);
                    if policy.allows(kind) {
                        RequestPausedDecision::Continue(None)
                    } else {
                        RequestPausedDecision::Fail(FailRequest {
                            request_id: intercepted.params.request_id,
                            error_reason: ErrorReason::BlockedByClient,
                        })
                    }
                },
            ))
            .map_err(backend_error)?;
        Ok(())
    }

    fn watch_network_idle(&self) -> Result<(), BackendError> {
        self.tab
            .call_method(Page::SetLifecycleEventsEnabled { enabled: true })
            .map_err(backend_error)?;

        let idle_marks = Arc::clone(&self.idle_marks);
        self.tab
            .add_event_listener(Arc::new(move |event: &Event| {
                if let Event::PageLifecycleEvent(lifecycle) = event {
                    let params = &lifecycle.params;
                    if let Some(mark) = idle_mark(&params.name, &params.frame_id, &params.loader_id) {
                        lock(&idle_marks).push(mark);
                    }
                }
            }))
            .map_err(backend_error)?;
        Ok(())
    }
}

impl PageContext for ChromePage {
    fn prepare(&self, viewport: Viewport, policy: &ResourcePolicy) -> Result<(), BackendError> {
        self.tab
            .call_method(Page::AddScriptToEvaluateOnNewDocument {
                source: STEALTH_SCRIPT.to_string(),
                world_name: None,
                include_command_line_api: None,
                run_immediately: None,
            })
            .map_err(backend_error)?;

        self.tab
            .set_bounds(Bounds::Normal {
                left: Some(0),
                top: Some(0),
                width: Some(f64::from(viewport.width)),
                height: Some(f64::from(viewport.height)),
            })
            .map_err(backend_error)?;

        self.watch_network_idle()?;
        self.install_resource_policy(policy)
    }

    fn navigate(&self, url: &str, timeout: Duration) -> Result<(), BackendError> {
        let deadline = Instant::now() + timeout;
        lock(&self.idle_marks).clear();

        self.tab.set_default_timeout(timeout);
        let started = self
            .tab
            .call_method(Page::Navigate {
                url: url.to_string(),
                referrer: None,
                transition_Type: None,
                frame_id: None,
                referrer_policy: None,
            })
            .map_err(backend_error)?;
        if let Some(error_text) = started.error_text {
            return Err(BackendError::Failed(error_text));
        }
        // Same-document navigation keeps the committed loader and loads nothing.
        let Some(loader_id) = started.loader_id else {
            return Ok(());
        };

        while !reached_idle(&lock(&self.idle_marks), &started.frame_id, &loader_id) {
            if Instant::now() >= deadline {
                return Err(BackendError::Timeout(format!(
                    "network not idle after {}ms",
                    timeout.as_millis()
                )));
            }
            thread::sleep(IDLE_POLL_INTERVAL);
        }
        Ok(())
    }

    fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<(), BackendError> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map(|_| ())
            .map_err(backend_error)
    }

    fn content(&self) -> Result<String, BackendError> {
        self.tab.get_content().map_err(backend_error)
    }

    fn inner_text(&self) -> Result<String, BackendError> {
        let object = self
            .tab
            .evaluate(INNER_TEXT_SCRIPT, false)
            .map_err(backend_error)?;
        match object.value {
            Some(serde_json::Value::String(text)) => Ok(text),
            Some(serde_json::Value::Null) | None => Ok(String::new()),
            Some(other) => Err(BackendError::Failed(format!(
                "innerText evaluated to non-string value: {}",
                other
            ))),
        }
    }

    fn close(&self) -> Result<(), BackendError> {
        self.tab.close(true).map(|_| ()).map_err(backend_error)
    }
}

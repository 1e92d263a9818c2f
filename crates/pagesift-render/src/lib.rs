//! Pagesift Render
//!
//! Turns a URL into fully rendered HTML plus visible text using a single,
//! lazily launched headless browser shared by all requests.
//!
//! # Architecture
//!
//! - [`RenderSession`] owns the browser and runs the per-request procedure
//!   (fresh page context, resource blocking, bounded navigation, retries)
//! - [`BrowserLauncher`], [`Browser`] and [`PageContext`] abstract the
//!   browser so the session can be driven by Chromium ([`ChromeLauncher`])
//!   or the scripted [`fake`] backend
//! - [`RenderError`] classifies every failure exactly once

#![warn(missing_docs)]

mod backend;
mod chrome;
mod config;
mod error;
pub mod fake;
mod policy;
mod session;

pub use backend::{Browser, BrowserLauncher, PageContext};
pub use chrome::{ChromeBrowser, ChromeLauncher, ChromePage};
pub use config::{LaunchConfig, RenderConfig, Viewport, AUTOMATION_CONTROLLED_FLAG};
pub use error::{BackendError, RenderError, Stage};
pub use policy::{ResourceKind, ResourcePolicy};
pub use session::RenderSession;

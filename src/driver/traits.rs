//! Page capability trait and error types
//!
//! This module defines the contract the crawler needs from a page-rendering
//! and interaction engine, independent of any particular engine's API.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Interval between presence checks in the default `wait_until_present`
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Errors that can occur while driving a page
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Timed out after {timeout:?} waiting for '{selector}'")]
    Timeout { selector: String, timeout: Duration },

    #[error("No element matches '{0}'")]
    NoSuchElement(String),

    #[error("Element {0} is no longer attached to the page")]
    StaleElement(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Click on element {element} failed: {message}")]
    Click { element: String, message: String },

    #[error("WebDriver error '{error}': {message}")]
    WebDriver { error: String, message: String },

    #[error("HTTP error talking to WebDriver: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected WebDriver response: {0}")]
    Protocol(String),

    #[error("Session is closed")]
    SessionClosed,
}

impl DriverError {
    /// Returns true if the error only means "the element did not show up"
    pub fn is_absence(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::NoSuchElement(_))
    }
}

/// Result type for page driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// Opaque reference to an element on the current page
///
/// Handles are cheap to clone and only meaningful to the session that
/// produced them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Page-rendering and interaction capability
///
/// One session is owned by exactly one crawl at a time; every method takes
/// `&mut self` so the borrow checker enforces that.
#[async_trait]
pub trait PageSession: Send {
    /// Loads `url` in the session
    async fn navigate(&mut self, url: &str) -> DriverResult<()>;

    /// Finds the first element matching `selector`, inside `scope` if given
    async fn find(
        &mut self,
        selector: &str,
        scope: Option<&ElementHandle>,
    ) -> DriverResult<Option<ElementHandle>>;

    /// Finds every element matching `selector` in document order
    async fn find_all(
        &mut self,
        selector: &str,
        scope: Option<&ElementHandle>,
    ) -> DriverResult<Vec<ElementHandle>>;

    /// Visible text of an element
    async fn text(&mut self, element: &ElementHandle) -> DriverResult<String>;

    /// Attribute value, `None` if the element has no such attribute
    async fn attribute(
        &mut self,
        element: &ElementHandle,
        name: &str,
    ) -> DriverResult<Option<String>>;

    async fn click(&mut self, element: &ElementHandle) -> DriverResult<()>;

    /// Ends the session; calling it more than once is harmless
    async fn close(&mut self) -> DriverResult<()>;

    /// Waits until an element matching `selector` is present
    ///
    /// Polls `find` every [`POLL_INTERVAL`] until the element appears or
    /// `timeout` elapses, in which case `DriverError::Timeout` is returned.
    async fn wait_until_present(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> DriverResult<ElementHandle> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(element) = self.find(selector, None).await? {
                return Ok(element);
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(DriverError::Timeout {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
        }
    }
}

//! Scripted in-memory page session
//!
//! `MemorySession` replays a fixed set of pages and detail panels instead of
//! talking to a browser. Elements declare which selectors they match and what
//! clicking them does, which is enough to drive a full crawl (listings,
//! detail views, pagination, failures) deterministically.

use crate::driver::traits::{DriverError, DriverResult, ElementHandle, PageSession};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// What happens when an element is clicked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    /// Click is accepted and changes nothing
    Nothing,
    /// Replace the current page (closes any open detail panel)
    OpenPage(String),
    /// Show a detail panel on top of the current page
    OpenDetail(String),
    /// Hide the open detail panel
    CloseDetail,
    /// The click raises an error
    Fail(String),
}

/// One node of a scripted page
#[derive(Debug, Clone)]
pub struct MemoryElement {
    id: String,
    selectors: Vec<String>,
    text: String,
    attributes: HashMap<String, String>,
    children: Vec<MemoryElement>,
    on_click: ClickAction,
}

impl MemoryElement {
    /// Creates an element; `id` must be unique across all pages and panels
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            selectors: Vec::new(),
            text: String::new(),
            attributes: HashMap::new(),
            children: Vec::new(),
            on_click: ClickAction::Nothing,
        }
    }

    /// Declares a selector this element matches
    pub fn matching(mut self, selector: impl Into<String>) -> Self {
        self.selectors.push(selector.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn child(mut self, child: MemoryElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = MemoryElement>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn on_click(mut self, action: ClickAction) -> Self {
        self.on_click = action;
        self
    }

    fn matches(&self, selector: &str) -> bool {
        self.selectors.iter().any(|s| s == selector)
    }

    fn locate(&self, id: &str) -> Option<&MemoryElement> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.locate(id))
    }
}

/// Collects matches in document order (pre-order traversal)
fn collect_matches<'a>(
    elements: &'a [MemoryElement],
    selector: &str,
    out: &mut Vec<&'a MemoryElement>,
) {
    for element in elements {
        if element.matches(selector) {
            out.push(element);
        }
        collect_matches(&element.children, selector, out);
    }
}

/// Page session backed by scripted pages
#[derive(Debug, Default)]
pub struct MemorySession {
    pages: HashMap<String, Vec<MemoryElement>>,
    details: HashMap<String, Vec<MemoryElement>>,
    routes: Vec<(String, String)>,
    default_page: Option<String>,
    current_page: Option<String>,
    open_detail: Option<String>,
    navigations: Vec<String>,
    clicks: Vec<String>,
    closed: bool,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a page under `key`
    pub fn with_page(mut self, key: impl Into<String>, elements: Vec<MemoryElement>) -> Self {
        self.pages.insert(key.into(), elements);
        self
    }

    /// Registers a detail panel under `key`
    pub fn with_detail(mut self, key: impl Into<String>, elements: Vec<MemoryElement>) -> Self {
        self.details.insert(key.into(), elements);
        self
    }

    /// Navigating to any URL containing `pattern` loads `page`
    ///
    /// Routes are tried in registration order.
    pub fn route(mut self, pattern: impl Into<String>, page: impl Into<String>) -> Self {
        self.routes.push((pattern.into(), page.into()));
        self
    }

    /// Page loaded for URLs that match no route
    pub fn with_default_page(mut self, page: impl Into<String>) -> Self {
        self.default_page = Some(page.into());
        self
    }

    /// Every URL passed to `navigate`, in order
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    /// Ids of every clicked element, in order
    pub fn clicks(&self) -> &[String] {
        &self.clicks
    }

    pub fn current_page(&self) -> Option<&str> {
        self.current_page.as_deref()
    }

    pub fn open_detail(&self) -> Option<&str> {
        self.open_detail.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> DriverResult<()> {
        if self.closed {
            Err(DriverError::SessionClosed)
        } else {
            Ok(())
        }
    }

    fn visible_roots(&self) -> [&[MemoryElement]; 2] {
        let page = self
            .current_page
            .as_ref()
            .and_then(|key| self.pages.get(key))
            .map(Vec::as_slice)
            .unwrap_or_default();
        let detail = self
            .open_detail
            .as_ref()
            .and_then(|key| self.details.get(key))
            .map(Vec::as_slice)
            .unwrap_or_default();
        [page, detail]
    }

    fn locate(&self, handle: &ElementHandle) -> DriverResult<&MemoryElement> {
        self.visible_roots()
            .into_iter()
            .flatten()
            .find_map(|root| root.locate(handle.id()))
            .ok_or_else(|| DriverError::StaleElement(handle.id().to_string()))
    }

    fn matches(&self, selector: &str, scope: Option<&ElementHandle>) -> DriverResult<Vec<&MemoryElement>> {
        let mut found = Vec::new();
        match scope {
            Some(handle) => {
                let element = self.locate(handle)?;
                collect_matches(&element.children, selector, &mut found);
            }
            None => {
                for roots in self.visible_roots() {
                    collect_matches(roots, selector, &mut found);
                }
            }
        }
        Ok(found)
    }

    fn resolve_route(&self, url: &str) -> Option<String> {
        self.routes
            .iter()
            .find(|(pattern, _)| url.contains(pattern.as_str()))
            .map(|(_, page)| page.clone())
            .or_else(|| self.default_page.clone())
    }
}

#[async_trait]
impl PageSession for MemorySession {
    async fn navigate(&mut self, url: &str) -> DriverResult<()> {
        self.ensure_open()?;
        self.navigations.push(url.to_string());

        let page = self.resolve_route(url).ok_or_else(|| DriverError::Navigation {
            url: url.to_string(),
            message: "no page routed for this URL".to_string(),
        })?;
        if !self.pages.contains_key(&page) {
            return Err(DriverError::Navigation {
                url: url.to_string(),
                message: format!("page '{}' is not registered", page),
            });
        }

        self.current_page = Some(page);
        self.open_detail = None;
        Ok(())
    }

    async fn find(
        &mut self,
        selector: &str,
        scope: Option<&ElementHandle>,
    ) -> DriverResult<Option<ElementHandle>> {
        self.ensure_open()?;
        let found = self.matches(selector, scope)?;
        Ok(found.first().map(|element| ElementHandle::new(element.id.as_str())))
    }

    async fn find_all(
        &mut self,
        selector: &str,
        scope: Option<&ElementHandle>,
    ) -> DriverResult<Vec<ElementHandle>> {
        self.ensure_open()?;
        let found = self.matches(selector, scope)?;
        Ok(found
            .into_iter()
            .map(|element| ElementHandle::new(element.id.as_str()))
            .collect())
    }

    async fn text(&mut self, element: &ElementHandle) -> DriverResult<String> {
        self.ensure_open()?;
        Ok(self.locate(element)?.text.clone())
    }

    async fn attribute(
        &mut self,
        element: &ElementHandle,
        name: &str,
    ) -> DriverResult<Option<String>> {
        self.ensure_open()?;
        Ok(self.locate(element)?.attributes.get(name).cloned())
    }

    async fn click(&mut self, element: &ElementHandle) -> DriverResult<()> {
        self.ensure_open()?;
        let action = self.locate(element)?.on_click.clone();
        self.clicks.push(element.id().to_string());

        match action {
            ClickAction::Nothing => {}
            ClickAction::OpenPage(page) => {
                if !self.pages.contains_key(&page) {
                    return Err(DriverError::Click {
                        element: element.id().to_string(),
                        message: format!("page '{}' is not registered", page),
                    });
                }
                self.current_page = Some(page);
                self.open_detail = None;
            }
            ClickAction::OpenDetail(detail) => {
                if !self.details.contains_key(&detail) {
                    return Err(DriverError::Click {
                        element: element.id().to_string(),
                        message: format!("detail '{}' is not registered", detail),
                    });
                }
                self.open_detail = Some(detail);
            }
            ClickAction::CloseDetail => self.open_detail = None,
            ClickAction::Fail(message) => {
                return Err(DriverError::Click {
                    element: element.id().to_string(),
                    message,
                });
            }
        }
        Ok(())
    }

    async fn close(&mut self) -> DriverResult<()> {
        self.closed = true;
        Ok(())
    }

    /// A scripted page never changes while waiting, so answer immediately
    async fn wait_until_present(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> DriverResult<ElementHandle> {
        self.find(selector, None)
            .await?
            .ok_or_else(|| DriverError::Timeout {
                selector: selector.to_string(),
                timeout,
            })
    }
}

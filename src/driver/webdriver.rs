//! W3C WebDriver page session
//!
//! This module drives a real browser through a WebDriver server
//! (chromedriver, geckodriver, a Selenium grid, ...) using the JSON wire
//! protocol over HTTP:
//! - `POST /session` to start a browser
//! - element lookup with CSS selectors, optionally scoped to an element
//! - text, attribute and click commands on element references
//! - `DELETE /session/{id}` to shut the browser down

use crate::config::DriverConfig;
use crate::driver::traits::{DriverError, DriverResult, ElementHandle, PageSession};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{json, Value};
use std::time::Duration;

/// Key under which W3C WebDriver returns element references
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Browser session behind a WebDriver server
pub struct WebDriverSession {
    client: Client,
    base_url: String,
    session_id: Option<String>,
}

impl WebDriverSession {
    /// Starts a new browser session
    ///
    /// # Arguments
    ///
    /// * `config` - WebDriver endpoint, browser name and headless flag
    ///
    /// # Returns
    ///
    /// * `Ok(WebDriverSession)` - A live session
    /// * `Err(DriverError)` - The server was unreachable or refused the session
    pub async fn connect(config: &DriverConfig) -> DriverResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let mut session = Self {
            client,
            base_url: config.webdriver_url.trim_end_matches('/').to_string(),
            session_id: None,
        };

        let url = format!("{}/session", session.base_url);
        let body = json!({ "capabilities": { "alwaysMatch": capabilities(config) } });
        let value = session.send(Method::POST, url, Some(body)).await?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| DriverError::Protocol(format!("missing sessionId in {}", value)))?;

        tracing::info!(
            "Started {} session {} via {}",
            config.browser,
            session_id,
            session.base_url
        );
        session.session_id = Some(session_id.to_string());
        Ok(session)
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Builds `<base>/session/<id>/<path>` for the live session
    fn endpoint(&self, path: &str) -> DriverResult<String> {
        let session_id = self.session_id.as_ref().ok_or(DriverError::SessionClosed)?;
        Ok(format!("{}/session/{}/{}", self.base_url, session_id, path))
    }

    /// Sends one command and unwraps the `value` member of the response
    async fn send(&self, method: Method, url: String, body: Option<Value>) -> DriverResult<Value> {
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let mut payload: Value = response
            .json()
            .await
            .map_err(|e| DriverError::Protocol(format!("invalid JSON from {}: {}", url, e)))?;
        let value = payload
            .get_mut("value")
            .map(Value::take)
            .unwrap_or(Value::Null);

        if status.is_success() {
            Ok(value)
        } else {
            Err(wire_error(&value))
        }
    }

    async fn element_command(
        &self,
        method: Method,
        element: &ElementHandle,
        command: &str,
        body: Option<Value>,
    ) -> DriverResult<Value> {
        let url = self.endpoint(&format!("element/{}/{}", element.id(), command))?;
        self.send(method, url, body).await
    }

    fn lookup_url(&self, many: bool, scope: Option<&ElementHandle>) -> DriverResult<String> {
        let kind = if many { "elements" } else { "element" };
        match scope {
            Some(element) => self.endpoint(&format!("element/{}/{}", element.id(), kind)),
            None => self.endpoint(kind),
        }
    }
}

/// Browser capabilities for the new-session request
fn capabilities(config: &DriverConfig) -> Value {
    let mut caps = json!({ "browserName": config.browser });
    if config.headless {
        match config.browser.as_str() {
            "chrome" | "chromium" => {
                caps["goog:chromeOptions"] = json!({ "args": ["--headless=new"] });
            }
            "firefox" => {
                caps["moz:firefoxOptions"] = json!({ "args": ["-headless"] });
            }
            other => {
                tracing::warn!("Headless mode is not known for browser '{}'", other);
            }
        }
    }
    caps
}

/// Maps a W3C error payload to a driver error
fn wire_error(value: &Value) -> DriverError {
    let error = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match error.as_str() {
        "no such element" => DriverError::NoSuchElement(message),
        "stale element reference" => DriverError::StaleElement(message),
        "invalid session id" => DriverError::SessionClosed,
        _ => DriverError::WebDriver { error, message },
    }
}

fn element_from(value: &Value) -> DriverResult<ElementHandle> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(ElementHandle::new)
        .ok_or_else(|| DriverError::Protocol(format!("expected element reference, got {}", value)))
}

#[async_trait]
impl PageSession for WebDriverSession {
    async fn navigate(&mut self, url: &str) -> DriverResult<()> {
        tracing::debug!("Navigating to {}", url);
        let endpoint = self.endpoint("url")?;
        self.send(Method::POST, endpoint, Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn find(
        &mut self,
        selector: &str,
        scope: Option<&ElementHandle>,
    ) -> DriverResult<Option<ElementHandle>> {
        let url = self.lookup_url(false, scope)?;
        let body = json!({ "using": "css selector", "value": selector });
        match self.send(Method::POST, url, Some(body)).await {
            Ok(value) => element_from(&value).map(Some),
            Err(DriverError::NoSuchElement(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn find_all(
        &mut self,
        selector: &str,
        scope: Option<&ElementHandle>,
    ) -> DriverResult<Vec<ElementHandle>> {
        let url = self.lookup_url(true, scope)?;
        let body = json!({ "using": "css selector", "value": selector });
        let value = self.send(Method::POST, url, Some(body)).await?;
        match value.as_array() {
            Some(items) => items.iter().map(element_from).collect(),
            None => Err(DriverError::Protocol(format!(
                "expected element list, got {}",
                value
            ))),
        }
    }

    async fn text(&mut self, element: &ElementHandle) -> DriverResult<String> {
        let value = self
            .element_command(Method::GET, element, "text", None)
            .await?;
        match value {
            Value::String(text) => Ok(text),
            Value::Null => Ok(String::new()),
            other => Err(DriverError::Protocol(format!(
                "expected text, got {}",
                other
            ))),
        }
    }

    async fn attribute(
        &mut self,
        element: &ElementHandle,
        name: &str,
    ) -> DriverResult<Option<String>> {
        let command = format!("attribute/{}", name);
        let value = self
            .element_command(Method::GET, element, &command, None)
            .await?;
        match value {
            Value::Null => Ok(None),
            Value::String(text) => Ok(Some(text)),
            Value::Bool(_) | Value::Number(_) => Ok(Some(value.to_string())),
            other => Err(DriverError::Protocol(format!(
                "expected attribute value, got {}",
                other
            ))),
        }
    }

    async fn click(&mut self, element: &ElementHandle) -> DriverResult<()> {
        self.element_command(Method::POST, element, "click", Some(json!({})))
            .await?;
        Ok(())
    }

    async fn close(&mut self) -> DriverResult<()> {
        if let Some(session_id) = self.session_id.take() {
            let url = format!("{}/session/{}", self.base_url, session_id);
            self.send(Method::DELETE, url, None).await?;
            tracing::info!("Closed browser session {}", session_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_error_mapping() {
        let no_element = json!({ "error": "no such element", "message": "h2 missing" });
        assert!(matches!(
            wire_error(&no_element),
            DriverError::NoSuchElement(m) if m == "h2 missing"
        ));

        let stale = json!({ "error": "stale element reference", "message": "gone" });
        assert!(matches!(wire_error(&stale), DriverError::StaleElement(_)));

        let closed = json!({ "error": "invalid session id", "message": "" });
        assert!(matches!(wire_error(&closed), DriverError::SessionClosed));

        let other = json!({ "error": "element click intercepted", "message": "overlay" });
        assert!(matches!(
            wire_error(&other),
            DriverError::WebDriver { error, .. } if error == "element click intercepted"
        ));

        assert!(matches!(
            wire_error(&Value::Null),
            DriverError::WebDriver { error, .. } if error == "unknown error"
        ));
    }

    #[test]
    fn test_element_from() {
        let value = json!({ ELEMENT_KEY: "abc-123" });
        assert_eq!(element_from(&value).unwrap(), ElementHandle::new("abc-123"));
        assert!(element_from(&json!({ "ELEMENT": "legacy" })).is_err());
    }

    #[test]
    fn test_capabilities() {
        let mut config = DriverConfig::default();
        assert_eq!(capabilities(&config), json!({ "browserName": "chrome" }));

        config.headless = true;
        assert_eq!(
            capabilities(&config),
            json!({
                "browserName": "chrome",
                "goog:chromeOptions": { "args": ["--headless=new"] }
            })
        );

        config.browser = "firefox".to_string();
        assert_eq!(
            capabilities(&config)["moz:firefoxOptions"]["args"][0],
            "-headless"
        );
    }
}

//! WebDriver wire protocol against a mock server

use listing_harvest::config::DriverConfig;
use listing_harvest::driver::{DriverError, ElementHandle, PageSession, WebDriverSession, ELEMENT_KEY};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ok(value: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "value": value }))
}

fn no_such_element() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "value": {
            "error": "no such element",
            "message": "Unable to locate element",
            "stacktrace": ""
        }
    }))
}

async fn connect(server: &MockServer) -> WebDriverSession {
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ok(json!({ "sessionId": "abc", "capabilities": {} })))
        .mount(server)
        .await;

    let config = DriverConfig {
        webdriver_url: server.uri(),
        ..Default::default()
    };
    WebDriverSession::connect(&config).await.unwrap()
}

#[tokio::test]
async fn test_connect_requests_browser() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session"))
        .and(body_json(json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": ["--headless=new"] }
                }
            }
        })))
        .respond_with(ok(json!({ "sessionId": "s-1", "capabilities": {} })))
        .expect(1)
        .mount(&server)
        .await;

    let config = DriverConfig {
        webdriver_url: format!("{}/", server.uri()),
        headless: true,
        ..Default::default()
    };
    let session = WebDriverSession::connect(&config).await.unwrap();
    assert_eq!(session.session_id(), Some("s-1"));
}

#[tokio::test]
async fn test_navigate_and_read_element() {
    let server = MockServer::start().await;
    let mut session = connect(&server).await;

    Mock::given(method("POST"))
        .and(path("/session/abc/url"))
        .and(body_json(json!({ "url": "https://www.google.com/search?tbm=lcl" })))
        .respond_with(ok(json!(null)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/abc/element"))
        .and(body_json(json!({ "using": "css selector", "value": "h2.qrShPb" })))
        .respond_with(ok(json!({ ELEMENT_KEY: "e-1" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/session/abc/element/e-1/text"))
        .respond_with(ok(json!("Jerk Hut")))
        .mount(&server)
        .await;

    session
        .navigate("https://www.google.com/search?tbm=lcl")
        .await
        .unwrap();
    let element = session.find("h2.qrShPb", None).await.unwrap().unwrap();
    assert_eq!(element, ElementHandle::new("e-1"));
    assert_eq!(session.text(&element).await.unwrap(), "Jerk Hut");
}

#[tokio::test]
async fn test_missing_element_is_none() {
    let server = MockServer::start().await;
    let mut session = connect(&server).await;

    Mock::given(method("POST"))
        .and(path("/session/abc/element"))
        .respond_with(no_such_element())
        .mount(&server)
        .await;

    assert!(session.find(".gone", None).await.unwrap().is_none());

    let err = session
        .wait_until_present(".gone", Duration::from_millis(300))
        .await
        .unwrap_err();
    assert!(matches!(err, DriverError::Timeout { .. }));
}

#[tokio::test]
async fn test_scoped_find_all_and_attributes() {
    let server = MockServer::start().await;
    let mut session = connect(&server).await;

    Mock::given(method("POST"))
        .and(path("/session/abc/element/c-1/elements"))
        .and(body_json(json!({ "using": "css selector", "value": "div.rllt__details" })))
        .respond_with(ok(json!([{ ELEMENT_KEY: "l-1" }, { ELEMENT_KEY: "l-2" }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/session/abc/element/l-1/attribute/href"))
        .respond_with(ok(json!("tel:+44 1904 000000")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/session/abc/element/l-2/attribute/href"))
        .respond_with(ok(json!(null)))
        .mount(&server)
        .await;

    let container = ElementHandle::new("c-1");
    let listings = session
        .find_all("div.rllt__details", Some(&container))
        .await
        .unwrap();
    assert_eq!(
        listings,
        vec![ElementHandle::new("l-1"), ElementHandle::new("l-2")]
    );

    assert_eq!(
        session.attribute(&listings[0], "href").await.unwrap().as_deref(),
        Some("tel:+44 1904 000000")
    );
    assert_eq!(session.attribute(&listings[1], "href").await.unwrap(), None);
}

#[tokio::test]
async fn test_click_error_is_reported() {
    let server = MockServer::start().await;
    let mut session = connect(&server).await;

    Mock::given(method("POST"))
        .and(path("/session/abc/element/l-1/click"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "value": {
                "error": "element click intercepted",
                "message": "another element would receive the click"
            }
        })))
        .mount(&server)
        .await;

    let err = session
        .click(&ElementHandle::new("l-1"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DriverError::WebDriver { ref error, .. } if error == "element click intercepted"
    ));
    assert!(!err.is_absence());
}

#[tokio::test]
async fn test_close_ends_session_once() {
    let server = MockServer::start().await;
    let mut session = connect(&server).await;

    Mock::given(method("DELETE"))
        .and(path("/session/abc"))
        .respond_with(ok(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    session.close().await.unwrap();
    session.close().await.unwrap();
    assert!(session.session_id().is_none());

    let err = session.find("h2", None).await.unwrap_err();
    assert!(matches!(err, DriverError::SessionClosed));
}

#[tokio::test]
async fn test_connect_fails_without_server() {
    let config = DriverConfig {
        webdriver_url: "http://127.0.0.1:1".to_string(),
        ..Default::default()
    };
    let err = WebDriverSession::connect(&config).await.err().unwrap();
    assert!(matches!(err, DriverError::Http(_)));
}

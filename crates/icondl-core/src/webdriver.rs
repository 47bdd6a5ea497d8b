//! Remote browser control over the W3C WebDriver protocol.
//!
//! Uses the curl crate (libcurl) for the JSON wire calls. Requests a Chrome
//! session with script execution enabled; both W3C and legacy (Selenium Grid
//! `desiredCapabilities`) session responses are accepted.

use serde_json::{json, Value};
use std::time::Duration;

use crate::config::HttpConfig;
use crate::crawl::{BrowserConnector, BrowserSession};
use crate::error::CrawlError;

/// Scrolls the last element matching `arguments[0]` into view and returns the match count.
const SCROLL_SCRIPT: &str = "const tiles = document.querySelectorAll(arguments[0]);\
 if (tiles.length) { tiles[tiles.length - 1].scrollIntoView(); }\
 return tiles.length;";

#[derive(Debug, Clone, Copy)]
enum Method {
    Get,
    Post,
    Delete,
}

/// Connects to a WebDriver endpoint such as `http://selenium:4444/wd/hub`.
#[derive(Debug, Clone)]
pub struct WebDriverConnector {
    endpoint: String,
    connect_timeout: Duration,
    timeout: Duration,
}

impl WebDriverConnector {
    pub fn new(endpoint: &str, http: &HttpConfig) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            connect_timeout: http.connect_timeout(),
            timeout: http.timeout(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl BrowserConnector for WebDriverConnector {
    fn connect(&self) -> Result<Box<dyn BrowserSession>, CrawlError> {
        let body = json!({
            "capabilities": { "alwaysMatch": { "browserName": "chrome" } },
            "desiredCapabilities": { "browserName": "chrome", "javascriptEnabled": true },
        });
        let url = format!("{}/session", self.endpoint);
        let resp = wire_call(self, Method::Post, &url, Some(&body))?;
        let session_id = resp
            .pointer("/value/sessionId")
            .or_else(|| resp.get("sessionId"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                CrawlError::CrawlerUnavailable("new session response has no sessionId".into())
            })?
            .to_string();
        tracing::debug!(endpoint = %self.endpoint, session = %session_id, "webdriver session created");
        Ok(Box::new(WebDriverSession {
            base: format!("{}/session/{}", self.endpoint, session_id),
            connector: self.clone(),
            closed: false,
        }))
    }
}

/// One live WebDriver session.
pub struct WebDriverSession {
    base: String,
    connector: WebDriverConnector,
    closed: bool,
}

impl WebDriverSession {
    fn call(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, CrawlError> {
        let url = format!("{}{}", self.base, path);
        let mut resp = wire_call(&self.connector, method, &url, body)?;
        Ok(resp.get_mut("value").map(Value::take).unwrap_or(Value::Null))
    }
}

impl BrowserSession for WebDriverSession {
    fn navigate(&mut self, url: &str) -> Result<(), CrawlError> {
        self.call(Method::Post, "/url", Some(&json!({ "url": url })))?;
        Ok(())
    }

    fn count_tiles(&mut self, selector: &str) -> Result<usize, CrawlError> {
        let body = json!({ "using": "css selector", "value": selector });
        let value = self.call(Method::Post, "/elements", Some(&body))?;
        value
            .as_array()
            .map(Vec::len)
            .ok_or_else(|| CrawlError::CrawlerUnavailable("find elements returned no list".into()))
    }

    fn scroll_to_last_tile(&mut self, selector: &str) -> Result<(), CrawlError> {
        let body = json!({ "script": SCROLL_SCRIPT, "args": [selector] });
        self.call(Method::Post, "/execute/sync", Some(&body))?;
        Ok(())
    }

    fn page_source(&mut self) -> Result<String, CrawlError> {
        match self.call(Method::Get, "/source", None)? {
            Value::String(s) => Ok(s),
            other => Err(CrawlError::CrawlerUnavailable(format!(
                "page source is not a string: {}",
                other
            ))),
        }
    }

    fn quit(&mut self) -> Result<(), CrawlError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.call(Method::Delete, "", None)?;
        tracing::debug!(session = %self.base, "webdriver session closed");
        Ok(())
    }
}

fn unavailable(context: &str, e: impl std::fmt::Display) -> CrawlError {
    CrawlError::CrawlerUnavailable(format!("{}: {}", context, e))
}

/// Performs one JSON request and returns the decoded response document.
/// Non-2xx responses are mapped to the WebDriver `error`/`message` pair when present.
fn wire_call(
    connector: &WebDriverConnector,
    method: Method,
    url: &str,
    body: Option<&Value>,
) -> Result<Value, CrawlError> {
    let curl_err = |e: curl::Error| unavailable(url, e);
    let mut response: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(curl_err)?;
    easy.connect_timeout(connector.connect_timeout).map_err(curl_err)?;
    easy.timeout(connector.timeout).map_err(curl_err)?;

    let mut list = curl::easy::List::new();
    list.append("Accept: application/json").map_err(curl_err)?;
    // no 100-continue round trip for JSON bodies
    list.append("Expect:").map_err(curl_err)?;
    match method {
        Method::Get => easy.get(true).map_err(curl_err)?,
        Method::Delete => easy.custom_request("DELETE").map_err(curl_err)?,
        Method::Post => {
            let payload = body.cloned().unwrap_or_else(|| json!({}));
            let bytes = serde_json::to_vec(&payload).map_err(|e| unavailable(url, e))?;
            list.append("Content-Type: application/json; charset=utf-8")
                .map_err(curl_err)?;
            easy.post(true).map_err(curl_err)?;
            easy.post_fields_copy(&bytes).map_err(curl_err)?;
        }
    }
    easy.http_headers(list).map_err(curl_err)?;

    {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| {
                response.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(curl_err)?;
        transfer.perform().map_err(curl_err)?;
    }

    let code = easy.response_code().map_err(curl_err)?;
    let doc: Value = if response.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&response).map_err(|e| unavailable(url, e))?
    };

    if !(200..300).contains(&code) {
        let error = doc.pointer("/value/error").and_then(Value::as_str).unwrap_or("unknown error");
        let message = doc.pointer("/value/message").and_then(Value::as_str).unwrap_or("");
        return Err(CrawlError::CrawlerUnavailable(format!(
            "{:?} {} returned HTTP {}: {} {}",
            method, url, code, error, message
        )));
    }
    Ok(doc)
}

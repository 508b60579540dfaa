// src/services/webdriver.rs

//! Browser-rendered fetching through a W3C WebDriver server.
//!
//! Talks to a running driver (e.g. `chromedriver --port=9515`) over its JSON
//! wire protocol: one session per run, navigated once per question.

use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::models::{FetcherConfig, QuestionId};
use crate::services::PageFetcher;
use crate::utils::http;

/// Remote error codes after which the session cannot be used again.
const SESSION_LOST_ERRORS: &[&str] = &[
    "invalid session id",
    "session not created",
    "no such window",
];

/// Envelope of every WebDriver response.
#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    value: Value,
}

/// Error payload carried in `value` on failure.
#[derive(Debug, Deserialize)]
struct WireError {
    error: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug)]
enum DriverError {
    Transport(reqwest::Error),
    Remote { error: String, message: String },
    Protocol(String),
}

impl DriverError {
    fn is_session_lost(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect(),
            Self::Remote { error, .. } => SESSION_LOST_ERRORS.contains(&error.as_str()),
            Self::Protocol(_) => true,
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "{e}"),
            Self::Remote { error, message } => write!(f, "{error}: {message}"),
            Self::Protocol(message) => write!(f, "unexpected driver response: {message}"),
        }
    }
}

impl From<reqwest::Error> for DriverError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e)
    }
}

/// Fetches pages through a live browser session.
pub struct WebDriverFetcher {
    client: Client,
    endpoint: String,
    session_id: String,
    config: FetcherConfig,
    closed: bool,
}

impl WebDriverFetcher {
    /// Open a new browser session on the driver at `endpoint`.
    pub async fn connect(endpoint: &str, config: &FetcherConfig) -> Result<Self> {
        let client = http::create_driver_client(config)?;
        let endpoint = endpoint.trim_end_matches('/').to_string();

        let body = json!({ "capabilities": { "alwaysMatch": capabilities(config) } });
        let value = send(&client, Method::POST, &format!("{endpoint}/session"), Some(body))
            .await
            .map_err(|e| AppError::session(format!("failed to start session: {e}")))?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::session("driver response has no sessionId"))?
            .to_string();

        log::info!(
            "WebDriver session {} started (headless={})",
            session_id,
            config.headless
        );

        Ok(Self {
            client,
            endpoint,
            session_id,
            config: config.clone(),
            closed: false,
        })
    }

    fn session_url(&self, command: &str) -> String {
        format!("{}/session/{}{}", self.endpoint, self.session_id, command)
    }

    fn classify(&self, question_id: QuestionId, error: DriverError) -> AppError {
        if error.is_session_lost() {
            AppError::session(format!("session {}: {error}", self.session_id))
        } else {
            AppError::fetch(question_id, error)
        }
    }
}

#[async_trait]
impl PageFetcher for WebDriverFetcher {
    async fn fetch(&mut self, question_id: QuestionId) -> Result<String> {
        let url = self.config.timeline_url(question_id)?;

        let navigate = json!({ "url": url.as_str() });
        send(&self.client, Method::POST, &self.session_url("/url"), Some(navigate))
            .await
            .map_err(|e| self.classify(question_id, e))?;

        let source = send(&self.client, Method::GET, &self.session_url("/source"), None)
            .await
            .map_err(|e| self.classify(question_id, e))?;

        match source {
            Value::String(html) => Ok(html),
            other => Err(AppError::fetch(
                question_id,
                format!("page source is not a string: {other}"),
            )),
        }
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        send(&self.client, Method::DELETE, &self.session_url(""), None)
            .await
            .map_err(|e| AppError::session(format!("failed to end session: {e}")))?;
        log::info!("WebDriver session {} closed", self.session_id);
        Ok(())
    }
}

impl Drop for WebDriverFetcher {
    fn drop(&mut self) {
        if !self.closed {
            log::warn!(
                "WebDriver session {} dropped without being closed",
                self.session_id
            );
        }
    }
}

/// Browser arguments for a scraping session.
fn chrome_args(headless: bool) -> Vec<&'static str> {
    let mut args = Vec::new();
    if headless {
        args.push("--headless");
    }
    args.extend([
        "--disable-gpu",
        "--no-sandbox",
        "--disable-dev-shm-usage",
        "--blink-settings=imagesEnabled=false",
    ]);
    args
}

/// Session capabilities requested from the driver.
fn capabilities(config: &FetcherConfig) -> Value {
    let timeout_ms = config.timeout().as_millis() as u64;
    json!({
        "browserName": "chrome",
        "pageLoadStrategy": "normal",
        "timeouts": {
            "pageLoad": timeout_ms,
            "script": timeout_ms,
        },
        "goog:chromeOptions": {
            "args": chrome_args(config.headless),
        },
    })
}

/// Issue one WebDriver command and unwrap its `value`.
async fn send(
    client: &Client,
    method: Method,
    url: &str,
    body: Option<Value>,
) -> std::result::Result<Value, DriverError> {
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;
    parse_response(status.is_success(), &text)
}

fn parse_response(success: bool, text: &str) -> std::result::Result<Value, DriverError> {
    let wire: WireResponse =
        serde_json::from_str(text).map_err(|e| DriverError::Protocol(e.to_string()))?;

    if success {
        return Ok(wire.value);
    }

    match serde_json::from_value::<WireError>(wire.value) {
        Ok(err) => Err(DriverError::Remote {
            error: err.error,
            message: err.message,
        }),
        Err(e) => Err(DriverError::Protocol(e.to_string())),
    }
}

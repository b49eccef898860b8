//! Answer service client
//!
//! [`AnswerService`] is the seam between the exchange controller and the
//! network. [`HttpAnswerService`] talks to the tutor backend over HTTP:
//! `POST /ask` for answers and `GET /` as a liveness probe.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::config::{ServiceConfig, NO_ANSWER_PLACEHOLDER};
use crate::error::ExchangeError;

/// Request body for `POST /ask`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// Response body for `POST /ask`. Extra fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskResponse {
    #[serde(default)]
    pub answer: Option<String>,
}

impl AskResponse {
    /// Read the answer out of any JSON body. The `answer` field is not
    /// validated: strings are taken verbatim, other values as their JSON
    /// text. A missing or null answer, or a body that is not an object,
    /// yields `None`.
    pub fn from_value(body: &Value) -> Self {
        let answer = match body.as_object().and_then(|fields| fields.get("answer")) {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => Some(other.to_string()),
        };
        Self { answer }
    }
}

/// Something that can answer a question
#[async_trait]
pub trait AnswerService: Send + Sync {
    /// Ask one question; a single round trip with no retry
    async fn ask(&self, question: &str) -> Result<String, ExchangeError>;

    /// Probe the service root, returning the body text
    async fn ping(&self) -> Result<String, ExchangeError>;
}

/// reqwest-backed client for the tutor backend
#[derive(Debug, Clone)]
pub struct HttpAnswerService {
    http_client: reqwest::Client,
    base_url: Url,
    timeout: Option<Duration>,
}

impl HttpAnswerService {
    /// Create a client for the given origin, with an optional request timeout
    pub fn new(base_url: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut base_url =
            Url::parse(base_url).with_context(|| format!("Invalid service URL: {}", base_url))?;
        // Url::join replaces the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url,
            timeout,
        })
    }

    pub fn from_config(config: &ServiceConfig) -> anyhow::Result<Self> {
        Self::new(&config.base_url, config.timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ExchangeError> {
        self.base_url
            .join(path)
            .map_err(|e| ExchangeError::Decode(format!("invalid endpoint {}: {}", path, e)))
    }

    fn map_send_error(&self, err: reqwest::Error) -> ExchangeError {
        match self.timeout {
            Some(timeout) if err.is_timeout() => ExchangeError::Timeout(timeout.as_secs()),
            _ => ExchangeError::from(err),
        }
    }
}

#[async_trait]
impl AnswerService for HttpAnswerService {
    async fn ask(&self, question: &str) -> Result<String, ExchangeError> {
        let url = self.endpoint("ask")?;
        tracing::debug!(%url, "POST ask");

        let response = self
            .http_client
            .post(url)
            .json(&AskRequest {
                question: question.to_string(),
            })
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExchangeError::Status(status.as_u16()));
        }

        let body: Value = response.json().await.map_err(|e| self.map_send_error(e))?;
        if !body.is_object() {
            tracing::warn!("answer body is not a JSON object");
        }
        Ok(AskResponse::from_value(&body)
            .answer
            .unwrap_or_else(|| NO_ANSWER_PLACEHOLDER.to_string()))
    }

    async fn ping(&self) -> Result<String, ExchangeError> {
        let url = self.endpoint("")?;
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        // Only transport failures count; the body is just logged
        response.text().await.map_err(|e| self.map_send_error(e))
    }
}

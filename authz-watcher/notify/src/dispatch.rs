use reqwest::{StatusCode, Url};
use std::time::Duration;
use thiserror::Error;
use tokio::time;

/// Sends a rendered notification to an external endpoint.
#[async_trait::async_trait]
pub trait Dispatch: Send + Sync {
    /// Performs a single delivery attempt.
    async fn dispatch(&self, message: &str) -> Result<(), DispatchError>;
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("notification endpoint is misconfigured: {0}")]
    Configuration(String),

    #[error("failed to reach notification endpoint: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("notification endpoint did not respond within {0:?}")]
    Timeout(Duration),

    #[error("notification endpoint responded with {0}")]
    Endpoint(StatusCode),
}

/// Posts `{"text": <message>}` to a Slack-style incoming webhook.
///
/// The endpoint is validated on each dispatch rather than at construction, so
/// a missing endpoint only fails the notifications that would use it.
#[derive(Clone, Debug)]
pub struct Webhook {
    client: reqwest::Client,
    endpoint: Option<String>,
    timeout: Duration,
}

#[derive(serde::Serialize)]
struct Payload<'a> {
    text: &'a str,
}

// === impl DispatchError ===

impl DispatchError {
    pub(crate) fn as_label(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
            Self::Endpoint(_) => "endpoint",
        }
    }
}

// === impl Webhook ===

impl Webhook {
    pub fn new(endpoint: Option<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            timeout,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url().is_ok()
    }

    fn url(&self) -> Result<Url, DispatchError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| DispatchError::Configuration("no webhook URL is set".to_string()))?;

        // Webhook URLs embed a credential, so parse errors must not echo them.
        let url = Url::parse(endpoint).map_err(|error| {
            DispatchError::Configuration(format!("invalid webhook URL: {error}"))
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(DispatchError::Configuration(format!(
                "unsupported webhook URL scheme: {scheme}"
            ))),
        }
    }
}

#[async_trait::async_trait]
impl Dispatch for Webhook {
    async fn dispatch(&self, message: &str) -> Result<(), DispatchError> {
        let url = self.url()?;

        let send = self.client.post(url).json(&Payload { text: message }).send();
        let rsp = time::timeout(self.timeout, send)
            .await
            .map_err(|_| DispatchError::Timeout(self.timeout))?
            .map_err(|error| DispatchError::Transport(error.without_url()))?;

        let status = rsp.status();
        if !status.is_success() {
            return Err(DispatchError::Endpoint(status));
        }
        Ok(())
    }
}

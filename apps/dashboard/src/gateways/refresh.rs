use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::UserIdentity;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Minimal HTTP seam for the refresh call. Returns the response status code
/// for any response received.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<u16, TransportError>;
}

/// Default transport. No timeout override beyond the client default.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<u16, TransportError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(response.status().as_u16())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RefreshDetail {
    /// A response was received. The code is recorded, never inspected.
    Status { code: u16 },
    NotConfigured,
    Transport { message: String },
}

impl fmt::Display for RefreshDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshDetail::Status { code } => write!(f, "HTTP {code}"),
            RefreshDetail::NotConfigured => f.write_str("JOB_REFRESH_ENDPOINT not configured"),
            RefreshDetail::Transport { message } => f.write_str(message),
        }
    }
}

/// Result of the refresh *request*; says nothing about the computation it starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshOutcome {
    pub accepted: bool,
    pub detail: RefreshDetail,
}

#[derive(Clone)]
pub struct JobRefreshGateway {
    endpoint: Option<String>,
    transport: Arc<dyn HttpTransport>,
}

impl JobRefreshGateway {
    pub fn new(endpoint: Option<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            endpoint,
            transport,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Single POST of `{"user_id": ...}`; no retry, no backoff.
    pub async fn request_refresh(&self, user: &UserIdentity) -> RefreshOutcome {
        let Some(endpoint) = self.endpoint.as_deref() else {
            return RefreshOutcome {
                accepted: false,
                detail: RefreshDetail::NotConfigured,
            };
        };

        let body = json!({ "user_id": user.as_str() });
        match self.transport.post_json(endpoint, &body).await {
            Ok(code) => {
                info!("Job refresh requested for {user} (status {code})");
                RefreshOutcome {
                    accepted: true,
                    detail: RefreshDetail::Status { code },
                }
            }
            Err(e) => {
                warn!("Job refresh request for {user} failed: {e}");
                RefreshOutcome {
                    accepted: false,
                    detail: RefreshDetail::Transport { message: e.0 },
                }
            }
        }
    }
}

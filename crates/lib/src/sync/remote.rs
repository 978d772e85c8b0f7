//! Remote endpoints that accept pending mutations.
//!
//! The sync manager pushes batches through the [`Remote`] trait so the
//! transport can be swapped (HTTP in production, in-process doubles in tests).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::SyncError;
use crate::{Result, offline::PendingMutation};

/// A destination for pending mutations.
#[async_trait]
pub trait Remote: Send + Sync + std::fmt::Debug {
    /// Short identifier used in logs (e.g. "http").
    fn kind(&self) -> &'static str;

    /// Deliver a batch. `Ok` means the remote has accepted every mutation in it.
    async fn push(&self, mutations: &[PendingMutation]) -> Result<()>;
}

/// Remote for hosts with nowhere to push; every push fails with
/// [`SyncError::NoRemote`] and the queue is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedRemote;

#[async_trait]
impl Remote for DetachedRemote {
    fn kind(&self) -> &'static str {
        "detached"
    }

    async fn push(&self, _mutations: &[PendingMutation]) -> Result<()> {
        Err(SyncError::NoRemote.into())
    }
}

/// Body of a push request.
#[derive(Serialize)]
struct PushRequest<'a> {
    mutations: &'a [PendingMutation],
}

/// Pushes batches as JSON over HTTP(S).
///
/// Each batch is a single `POST` of `{"mutations": [...]}`; any 2xx status
/// acknowledges the whole batch.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    endpoint: Url,
    token: Option<String>,
}

impl HttpRemote {
    /// Remote posting to `endpoint`, which must be an http or https URL.
    pub fn new(endpoint: &str) -> Result<Self> {
        let parsed = Url::parse(endpoint).map_err(|e| SyncError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SyncError::InvalidEndpoint {
                url: endpoint.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            }
            .into());
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SyncError::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: parsed,
            token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Remote for HttpRemote {
    fn kind(&self) -> &'static str {
        "http"
    }

    async fn push(&self, mutations: &[PendingMutation]) -> Result<()> {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .json(&PushRequest { mutations });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::RemoteRejected {
                status: status.as_u16(),
                body,
            }
            .into());
        }
        debug!(count = mutations.len(), endpoint = %self.endpoint, "Remote accepted batch");
        Ok(())
    }
}

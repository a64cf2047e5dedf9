// src/core/service_client.rs
//! HTTP client for the external matching service. Every network failure is
//! converted into a [`MatchFailure`] here and never escapes as an error.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::core::request_builder::MatchPayload;
use crate::error::{MatchFailure, TransportError};
use crate::types::response::{CustomMatchResponse, DatasetMatchResponse, ErrorResponse};
use crate::types::{CustomResult, DatasetResultSet, MatchOutcome, Workflow};

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The single suspension point of a workflow.
#[async_trait]
pub trait MatchTransport: Send + Sync {
    async fn post_multipart(
        &self,
        url: &str,
        payload: &MatchPayload,
    ) -> Result<RawResponse, TransportError>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// No timeout unless one is configured.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl MatchTransport for ReqwestTransport {
    async fn post_multipart(
        &self,
        url: &str,
        payload: &MatchPayload,
    ) -> Result<RawResponse, TransportError> {
        let form = payload.to_form()?;

        let response = self.client.post(url).multipart(form).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(RawResponse::new(status, body.to_vec()))
    }
}

/// Absolute base URL of the matching service, without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// A relative `api_base` (reverse-proxied deployments) is resolved
    /// against `origin`.
    pub fn parse(api_base: &str, origin: Option<&str>) -> Result<Self> {
        let api_base = api_base.trim();
        let url = if api_base.contains("://") {
            Url::parse(api_base).with_context(|| format!("Invalid api_base: {}", api_base))?
        } else {
            let origin = origin.with_context(|| {
                format!("api_base '{}' is relative but no origin is configured", api_base)
            })?;
            Url::parse(origin)
                .with_context(|| format!("Invalid origin: {}", origin))?
                .join(api_base)
                .with_context(|| format!("Cannot join '{}' onto '{}'", api_base, origin))?
        };

        Ok(Self(url.as_str().trim_end_matches('/').to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn endpoint(&self, workflow: Workflow) -> String {
        format!("{}{}", self.0, workflow.endpoint())
    }
}

/// Shape a 2xx body is decoded into. Missing or unreadable fields fall back
/// to empty values instead of failing.
pub trait FromSuccessBody: Sized {
    fn from_body(body: &[u8]) -> Self;
}

fn decode_lenient<W: DeserializeOwned + Default>(body: &[u8]) -> W {
    match serde_json::from_slice::<W>(body) {
        Ok(wire) => wire,
        Err(e) => {
            warn!(
                "Malformed success body ({} bytes), using empty result: {}",
                body.len(),
                e
            );
            W::default()
        }
    }
}

impl FromSuccessBody for DatasetResultSet {
    fn from_body(body: &[u8]) -> Self {
        decode_lenient::<DatasetMatchResponse>(body).into()
    }
}

impl FromSuccessBody for CustomResult {
    fn from_body(body: &[u8]) -> Self {
        decode_lenient::<CustomMatchResponse>(body).into()
    }
}

pub(crate) fn normalize<R: FromSuccessBody>(
    exchange: Result<RawResponse, TransportError>,
) -> MatchOutcome<R> {
    let response = match exchange {
        Ok(response) => response,
        Err(TransportError(detail)) => {
            return Err(MatchFailure::Transport {
                status: None,
                detail: Some(detail).filter(|d| !d.trim().is_empty()),
            });
        }
    };

    if response.is_success() {
        return Ok(R::from_body(&response.body));
    }

    let server_message = serde_json::from_slice::<ErrorResponse>(&response.body)
        .ok()
        .and_then(|e| e.usable_message().map(str::to_string));

    match server_message {
        Some(message) => Err(MatchFailure::Service {
            status: response.status,
            message,
        }),
        None => Err(MatchFailure::Transport {
            status: Some(response.status),
            detail: Some(format!(
                "Request failed with status code {}",
                response.status
            )),
        }),
    }
}

#[derive(Clone)]
pub struct MatchingClient {
    transport: Arc<dyn MatchTransport>,
    base_url: BaseUrl,
}

impl MatchingClient {
    pub fn new(transport: Arc<dyn MatchTransport>, base_url: BaseUrl) -> Self {
        Self {
            transport,
            base_url,
        }
    }

    /// Client over reqwest with an optional per-request timeout
    pub fn over_http(base_url: BaseUrl, timeout: Option<Duration>) -> Result<Self> {
        let transport = ReqwestTransport::new(timeout)?;
        Ok(Self::new(Arc::new(transport), base_url))
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Send one request to the endpoint of `payload.workflow`. No retries.
    pub async fn submit<R: FromSuccessBody>(&self, payload: &MatchPayload) -> MatchOutcome<R> {
        let url = self.base_url.endpoint(payload.workflow);
        info!("Calling matching service: {}", url);

        let exchange = self.transport.post_multipart(&url, payload).await;
        if let Ok(response) = &exchange {
            debug!("Response status: {}", response.status);
        }

        let outcome = normalize::<R>(exchange);
        if let Err(failure) = &outcome {
            error!("Matching service call to {} failed: {}", url, failure);
        }
        outcome
    }
}

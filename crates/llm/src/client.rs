//! Thin HTTP client wrapping the upstream call the Endpoint Builder addresses.
//!
//! Kept separate from the translators so they stay pure and synchronous; this is the
//! only place in the crate that touches the network.

use std::time::Duration;

use eventsource_stream::Eventsource;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use secrecy::SecretString;

use crate::endpoint::build_url;
use crate::error::{GatewayError, Result, UpstreamError};
use crate::google::{GenerateRequest, GenerateResponse};

/// Ceiling on the time to obtain a response (or the initial streaming headers) from
/// the upstream provider.
pub const UPSTREAM_CALL_TIMEOUT: Duration = Duration::from_secs(60);

pub type UpstreamEventStream = BoxStream<'static, std::result::Result<eventsource_stream::Event, eventsource_stream::EventStreamError<reqwest::Error>>>;

#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
}

impl UpstreamClient {
    pub fn new() -> Self {
        Self { http: reqwest::Client::new() }
    }

    /// Issue a single non-streaming `generateContent` call.
    pub async fn generate(
        &self,
        base_url: &str,
        model: &str,
        api_key: &SecretString,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse> {
        let url = build_url(base_url, model, api_key, false);

        let response = tokio::time::timeout(UPSTREAM_CALL_TIMEOUT, self.http.post(&url).json(request).send())
            .await
            .map_err(|_| GatewayError::Timeout)?
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(GatewayError::Upstream(status_error(response).await));
        }

        response
            .json()
            .await
            .map_err(|err| GatewayError::Internal(format!("failed to parse upstream response: {err}")))
    }

    /// Issue a `streamGenerateContent` call and return its SSE frame stream. The 60s
    /// ceiling covers obtaining the response headers; once streaming starts, the
    /// caller enforces the 30s inter-chunk idle timeout.
    pub async fn generate_stream(
        &self,
        base_url: &str,
        model: &str,
        api_key: &SecretString,
        request: &GenerateRequest,
    ) -> Result<UpstreamEventStream> {
        let url = build_url(base_url, model, api_key, true);

        let response = tokio::time::timeout(UPSTREAM_CALL_TIMEOUT, self.http.post(&url).json(request).send())
            .await
            .map_err(|_| GatewayError::Timeout)?
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(GatewayError::Upstream(status_error(response).await));
        }

        Ok(response.bytes_stream().eventsource().boxed())
    }
}

impl Default for UpstreamClient {
    fn default() -> Self {
        Self::new()
    }
}

fn map_transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Upstream(UpstreamError::new(502, err.to_string(), None))
    }
}

async fn status_error(response: reqwest::Response) -> UpstreamError {
    let status = response.status().as_u16();
    let body = response.text().await.ok();
    UpstreamError::new(status, format!("upstream returned HTTP {status}"), body)
}

//! The I/O half of a request: turning an `HttpRequest` into an `HttpResponse`.
//!
//! `Transport` is the seam where a host plugs in its own HTTP stack.
//! `UreqTransport` is the bundled implementation; ureq is blocking, so inside
//! a tokio runtime each call runs on the blocking pool. Under any other
//! executor the call runs inline on the polling thread.

use std::future::Future;

use ureq::Agent;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one HTTP round trip.
///
/// Non-2xx statuses must come back as `Ok(HttpResponse)`; only failures of
/// the round trip itself are `Err`.
pub trait Transport: Send + Sync {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, ApiError>> + Send;
}

/// `Transport` backed by a ureq agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        // Status codes are data here; `Utils` decides what a 4xx/5xx means.
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let agent = self.agent.clone();
                handle
                    .spawn_blocking(move || execute_blocking(&agent, request))
                    .await
                    .map_err(|e| ApiError::Transport(e.to_string()))?
            }
            Err(_) => execute_blocking(&self.agent, request),
        }
    }
}

fn execute_blocking(agent: &Agent, request: HttpRequest) -> Result<HttpResponse, ApiError> {
    let HttpRequest {
        method,
        url,
        headers,
        body,
    } = request;

    let result = match method {
        HttpMethod::Get | HttpMethod::Delete => {
            let mut builder = if method == HttpMethod::Get {
                agent.get(&url)
            } else {
                agent.delete(&url)
            };
            for (name, value) in &headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder.call()
        }
        HttpMethod::Post | HttpMethod::Put => {
            let mut builder = if method == HttpMethod::Post {
                agent.post(&url)
            } else {
                agent.put(&url)
            };
            for (name, value) in &headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            match body {
                Some(body) => builder.send(body.as_bytes()),
                None => builder.send_empty(),
            }
        }
    };

    let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    // No size cap: a successful body is returned whole.
    let body = response
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_string()
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    tracing::trace!(status, "response received");

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

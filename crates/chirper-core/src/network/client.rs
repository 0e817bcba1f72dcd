//! HTTP client with rate limiting awareness.
//!
//! Provides a wrapper around reqwest with:
//! - Base URL joining and bearer token injection
//! - Rate limit tracking from response headers
//! - Automatic throttling when approaching limits
//! - Mapping of error statuses onto [`ChirperError`]

use crate::config::{AppConfig, ClientSettings, NetworkConfig};
use crate::models::ValidationBody;
use crate::{ChirperError, Result};
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Rate limit state extracted from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimitState {
    /// Remaining requests allowed.
    pub remaining: Option<u64>,
    /// Total request limit.
    pub limit: Option<u64>,
    /// Unix timestamp when the rate limit resets.
    pub reset: Option<u64>,
}

impl RateLimitState {
    /// Check if we should throttle requests.
    pub fn should_throttle(&self) -> bool {
        match (self.remaining, self.limit) {
            (Some(remaining), Some(limit)) if limit > 0 => {
                // Throttle when below 10% of limit
                let threshold = (limit as f64 * 0.1) as u64;
                remaining < threshold.max(1)
            }
            _ => false,
        }
    }
}

/// HTTP client bound to one backend.
pub struct HttpClient {
    client: Client,
    base_url: Url,
    auth_token: Option<String>,
    rate_limit_remaining: AtomicI64,
    rate_limit_limit: AtomicU64,
    rate_limit_reset: AtomicU64,
    throttle_delay: Duration,
}

impl HttpClient {
    /// Create a client from settings.
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(settings.request_timeout)
            .user_agent(AppConfig::USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| ChirperError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                cause: None,
            })?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            auth_token: settings.auth_token.clone(),
            rate_limit_remaining: AtomicI64::new(-1),
            rate_limit_limit: AtomicU64::new(0),
            rate_limit_reset: AtomicU64::new(0),
            throttle_delay: NetworkConfig::THROTTLE_DELAY,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a path like `chirps/4` or `/chirps?page=2` against the base URL.
    pub fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Get the current rate limit state.
    pub fn rate_limit_state(&self) -> RateLimitState {
        let remaining = self.rate_limit_remaining.load(Ordering::SeqCst);
        let limit = self.rate_limit_limit.load(Ordering::SeqCst);
        let reset = self.rate_limit_reset.load(Ordering::SeqCst);
        RateLimitState {
            remaining: (remaining >= 0).then_some(remaining as u64),
            limit: (limit > 0).then_some(limit),
            reset: (reset > 0).then_some(reset),
        }
    }

    /// GET a path and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(Method::GET, path, None::<&()>).await?;
        decode(response, path).await
    }

    /// POST a JSON body and decode the JSON reply.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.send(Method::POST, path, Some(body)).await?;
        decode(response, path).await
    }

    /// POST a JSON body, ignoring whatever the backend replies with.
    pub async fn post_discard<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        self.send(Method::POST, path, Some(body)).await?;
        Ok(())
    }

    /// PATCH a JSON body and decode the JSON reply.
    pub async fn patch_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.send(Method::PATCH, path, Some(body)).await?;
        decode(response, path).await
    }

    /// DELETE a path.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(Method::DELETE, path, None::<&()>).await?;
        Ok(())
    }

    /// Check if an HTTP status code indicates a retryable error.
    pub fn is_retryable_status(status: StatusCode) -> bool {
        matches!(status.as_u16(), 408 | 429 | 500 | 502 | 503 | 504)
    }

    // Internal methods

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response> {
        self.maybe_throttle().await;

        let url = self.url(path)?;
        debug!("{} {}", method, url);

        let mut request = self.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ChirperError::from(e)
            } else {
                ChirperError::Network {
                    message: format!("{} {} failed: {}", method, path, e),
                    cause: std::error::Error::source(&e).map(|s| s.to_string()),
                }
            }
        })?;

        self.update_rate_limits(&response);
        check_response_status(response, path, &self.base_url).await
    }

    async fn maybe_throttle(&self) {
        let state = self.rate_limit_state();
        if state.should_throttle() {
            warn!(
                "Rate limit approaching (remaining: {:?}/{:?}), throttling for {:?}",
                state.remaining, state.limit, self.throttle_delay
            );
            tokio::time::sleep(self.throttle_delay).await;
        }
    }

    fn update_rate_limits(&self, response: &Response) {
        let headers = response.headers();

        if let Some(num) = header_number::<i64>(headers, "X-RateLimit-Remaining") {
            self.rate_limit_remaining.store(num, Ordering::SeqCst);
        }
        if let Some(num) = header_number::<u64>(headers, "X-RateLimit-Limit") {
            self.rate_limit_limit.store(num, Ordering::SeqCst);
        }
        if let Some(num) = header_number::<u64>(headers, "X-RateLimit-Reset") {
            self.rate_limit_reset.store(num, Ordering::SeqCst);
        }

        let remaining = self.rate_limit_remaining.load(Ordering::SeqCst);
        let limit = self.rate_limit_limit.load(Ordering::SeqCst);
        if remaining >= 0 && limit > 0 {
            debug!("Rate limit: {}/{}", remaining, limit);
        }
    }
}

fn header_number<T: std::str::FromStr>(headers: &header::HeaderMap, name: &str) -> Option<T> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ChirperError::Json {
        message: format!("Failed to parse response from {}: {}", path, e),
        source: Some(e),
    })
}

/// Turn non-2xx responses into errors.
async fn check_response_status(response: Response, path: &str, base: &Url) -> Result<Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = header_number::<u64>(response.headers(), header::RETRY_AFTER.as_str());
        return Err(ChirperError::RateLimited {
            service: base.host_str().unwrap_or("unknown").to_string(),
            retry_after_secs: retry_after,
        });
    }

    let body = response.text().await.unwrap_or_default();

    match status {
        StatusCode::UNPROCESSABLE_ENTITY => {
            let parsed: ValidationBody = serde_json::from_str(&body).unwrap_or_default();
            let mut errors = parsed.errors;
            if errors.is_empty() {
                if let Some(message) = parsed.message {
                    errors.push("general", &message);
                }
            }
            Err(ChirperError::Validation { errors })
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ChirperError::Unauthorized {
            status: status.as_u16(),
            message: error_message(&body, status),
        }),
        StatusCode::NOT_FOUND => Err(ChirperError::NotFound {
            path: path.to_string(),
        }),
        _ => Err(ChirperError::Http {
            status: status.as_u16(),
            path: path.to_string(),
            message: error_message(&body, status),
        }),
    }
}

/// Prefer the backend's `message` field, fall back to the raw body or reason phrase.
fn error_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .filter(|m| !m.is_empty())
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string())
}

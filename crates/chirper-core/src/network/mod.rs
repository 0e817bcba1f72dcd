//! Network utilities for HTTP operations and retries.
//!
//! This module provides:
//! - HTTP client bound to the backend, with rate limiting awareness
//! - Retry logic with exponential backoff and jitter

mod client;
mod retry;

pub use client::{HttpClient, RateLimitState};
pub use retry::{retry_async, RetryConfig};

//! HTTP transport module
//!
//! The single transport every call goes through.
//!
//! # Features
//!
//! - **Authentication**: credentials attached per request
//! - **Rate Limiting**: optional token bucket limiter using governor
//! - **Retries**: opt-in, with constant, linear or exponential backoff

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};

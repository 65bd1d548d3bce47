//! Per-client rate limiting middleware.
//!
//! Submissions are counted against a fixed time window per client IP. Jobs
//! that pass this gate are never rate-accounted again; the queue trusts
//! admission entirely.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::config::RateLimitConfig;
use crate::http::response;
use crate::observability::metrics;

/// Counter for one client within the current window.
struct Window {
    started: Instant,
    count: u32,
}

/// State for the fixed-window rate limiter.
pub struct RateLimiterState {
    windows: Mutex<HashMap<IpAddr, Window>>,
    config: RateLimitConfig,
}

impl RateLimiterState {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Count one request from `client`; false means over the limit.
    fn check(&self, client: IpAddr) -> bool {
        if !self.config.enabled {
            return true;
        }

        let now = Instant::now();
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");
        let window = windows.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started).as_secs() >= self.config.window_secs {
            window.started = now;
            window.count = 0;
        }

        if window.count < self.config.max_requests {
            window.count += 1;
            true
        } else {
            false
        }
    }

    fn rejection_message(&self) -> String {
        format!(
            "Rate limit exceeded: at most {} requests per {} seconds",
            self.config.max_requests, self.config.window_secs
        )
    }
}

/// Middleware guarding the submission endpoint.
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = addr.ip();
    if state.check(client) {
        next.run(request).await
    } else {
        tracing::warn!(client = %client, "Rate limit exceeded");
        metrics::record_rate_limited();
        response::failure(429, &state.rejection_message())
    }
}

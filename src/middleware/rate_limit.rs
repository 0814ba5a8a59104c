//! Rate limiting middleware.
//!
//! Fixed-window, per-IP request counting. Requests without connection info
//! (in-process tests, unix sockets) share a single bucket.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::warn;

/// Configuration for rate limiting.
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }
}

/// Limits applied to the whole app, to login, and to product routes.
#[derive(Clone, Debug)]
pub struct RateLimitTiers {
    pub global: RateLimitConfig,
    pub auth: RateLimitConfig,
    pub products: RateLimitConfig,
}

impl Default for RateLimitTiers {
    fn default() -> Self {
        Self {
            global: RateLimitConfig::new(100, Duration::from_secs(15 * 60)),
            auth: RateLimitConfig::new(10, Duration::from_secs(5 * 60)),
            products: RateLimitConfig::new(50, Duration::from_secs(60)),
        }
    }
}

/// One limiter per tier, shared by every request.
#[derive(Clone)]
pub struct RateLimiters {
    pub global: RateLimiter,
    pub auth: RateLimiter,
    pub products: RateLimiter,
}

impl RateLimiters {
    pub fn new(tiers: &RateLimitTiers) -> Self {
        Self {
            global: RateLimiter::new("global", tiers.global.clone()),
            auth: RateLimiter::new("auth", tiers.auth.clone()),
            products: RateLimiter::new("products", tiers.products.clone()),
        }
    }

    pub fn spawn_cleanup(&self) -> Vec<JoinHandle<()>> {
        vec![
            self.global.spawn_cleanup(),
            self.auth.spawn_cleanup(),
            self.products.spawn_cleanup(),
        ]
    }
}

/// Rate limiter state tracking requests per IP.
#[derive(Clone)]
pub struct RateLimiter {
    name: &'static str,
    config: RateLimitConfig,
    state: Arc<Mutex<HashMap<IpAddr, RateLimitEntry>>>,
}

struct RateLimitEntry {
    count: u32,
    window_start: Instant,
}

enum RateLimitResult {
    Allowed,
    Exceeded { retry_after: Duration },
}

impl RateLimiter {
    pub fn new(name: &'static str, config: RateLimitConfig) -> Self {
        Self {
            name,
            config,
            state: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Check if request should be allowed.
    fn check(&self, ip: IpAddr) -> RateLimitResult {
        let mut state = self.state.lock();
        let now = Instant::now();

        let entry = state.entry(ip).or_insert(RateLimitEntry {
            count: 0,
            window_start: now,
        });

        // Reset window if expired
        if now.duration_since(entry.window_start) >= self.config.window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;

        if entry.count > self.config.max_requests {
            let reset_at = entry.window_start + self.config.window;
            RateLimitResult::Exceeded {
                retry_after: reset_at.saturating_duration_since(now),
            }
        } else {
            RateLimitResult::Allowed
        }
    }

    /// Periodic cleanup of old entries.
    pub fn cleanup(&self) {
        let mut state = self.state.lock();
        let now = Instant::now();
        let window = self.config.window;

        state.retain(|_, entry| now.duration_since(entry.window_start) < window);
    }

    /// Run `cleanup` once per window in the background.
    pub fn spawn_cleanup(&self) -> JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(limiter.config.window);
            loop {
                ticker.tick().await;
                limiter.cleanup();
            }
        })
    }

    #[cfg(test)]
    fn tracked_ips(&self) -> usize {
        self.state.lock().len()
    }
}

/// Rate limiting middleware function.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ip = connect_info
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    match limiter.check(ip) {
        RateLimitResult::Allowed => next.run(request).await,
        RateLimitResult::Exceeded { retry_after } => {
            warn!(
                ip = %ip,
                tier = limiter.name,
                retry_after_secs = retry_after.as_secs(),
                "Rate limit exceeded"
            );

            let body = serde_json::json!({
                "success": false,
                "error": "rate_limit_exceeded",
                "message": "Too many requests. Please slow down.",
                "retry_after_seconds": retry_after.as_secs(),
            });

            (
                StatusCode::TOO_MANY_REQUESTS,
                [("Retry-After", retry_after.as_secs().to_string())],
                Json(body),
            )
                .into_response()
        }
    }
}

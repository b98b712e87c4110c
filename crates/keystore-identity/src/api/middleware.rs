//! Rate limiting and other middleware.

use crate::error::IdentityError;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{num::NonZeroU32, sync::Arc, time::Instant};
use tracing::{debug, error, warn};

/// Global rate limiter (not keyed by IP).
pub type GlobalLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiter state shared across requests.
#[derive(Clone, Default)]
pub struct RateLimitState {
    /// Global rate limiter, `None` when limiting is disabled
    pub global: Option<Arc<GlobalLimiter>>,
}

impl RateLimitState {
    /// Create a rate limit state allowing `requests_per_minute`.
    ///
    /// Zero disables rate limiting.
    pub fn new(requests_per_minute: u32) -> Self {
        Self {
            global: NonZeroU32::new(requests_per_minute)
                .map(|rpm| Arc::new(RateLimiter::direct(Quota::per_minute(rpm)))),
        }
    }

    /// A state that never limits.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.global.is_some()
    }
}

/// Rate limiting middleware.
///
/// Returns 429 Too Many Requests once the global quota is exhausted.
pub async fn rate_limit_middleware(
    State(rate_limit): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Result<Response, IdentityError> {
    if let Some(global) = &rate_limit.global {
        if global.check().is_err() {
            warn!("Global rate limit exceeded");
            return Err(IdentityError::RateLimitExceeded);
        }
        debug!("Rate limit check passed");
    }

    Ok(next.run(request).await)
}

/// Stamp `Content-Type: application/json` on every API response.
pub async fn json_content_type(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

/// Log each request with its path, status and latency.
///
/// Unknown and malformed addresses are ordinary outcomes and log at debug.
/// Throttled requests log at warn, server errors at error.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis() as u64;

    if status.is_server_error() {
        error!(%method, %path, %status, elapsed_ms, "Request errored");
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        warn!(%method, %path, elapsed_ms, "Request throttled");
    } else {
        debug!(%method, %path, %status, elapsed_ms, "Request served");
    }

    response
}

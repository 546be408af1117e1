//! Rate limiting middleware using token bucket algorithm

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::QuantaClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;
use studyhub_common::{config::RateLimitConfig, errors::AppError};

/// Rate limiter using governor crate
pub type GlobalRateLimiter = RateLimiter<NotKeyed, InMemoryState, QuantaClock>;

/// Limiter shared by the model-backed endpoints
#[derive(Clone)]
pub struct ModelRateLimit {
    limiter: Option<Arc<GlobalRateLimiter>>,
    requests_per_second: u32,
}

impl ModelRateLimit {
    /// Build from config; disabled or zero quotas let every request through
    pub fn from_config(config: &RateLimitConfig) -> Self {
        let limiter = match (
            config.enabled,
            NonZeroU32::new(config.requests_per_second),
            NonZeroU32::new(config.burst),
        ) {
            (true, Some(rps), Some(burst)) => {
                Some(Arc::new(RateLimiter::direct(Quota::per_second(rps).allow_burst(burst))))
            }
            (true, _, _) => {
                tracing::warn!("Rate limit enabled with a zero quota, limiting disabled");
                None
            }
            _ => None,
        };

        Self {
            limiter,
            requests_per_second: config.requests_per_second,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    fn check(&self) -> bool {
        self.limiter.as_ref().map_or(true, |l| l.check().is_ok())
    }
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(limit): State<ModelRateLimit>,
    request: Request,
    next: Next,
) -> Response {
    if limit.check() {
        return next.run(request).await;
    }

    tracing::warn!(path = %request.uri().path(), "Rate limit exceeded");
    AppError::RateLimited {
        limit: limit.requests_per_second,
    }
    .into_response()
}

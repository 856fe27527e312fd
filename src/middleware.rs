//! Outer layers: CORS, security headers, per-IP rate limiting.

use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Mutex,
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
};
use tracing::warn;

use crate::{config::{AppConfig, RateLimitConfig}, error::ApiError, state::AppState};

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
    style-src 'self' 'unsafe-inline' https://cdnjs.cloudflare.com https://fonts.googleapis.com; \
    script-src 'self' 'unsafe-inline'; script-src-attr 'unsafe-inline'; \
    img-src 'self' data: https:; connect-src 'self'; \
    font-src 'self' https://fonts.gstatic.com https://cdnjs.cloudflare.com; \
    object-src 'none'; media-src 'self'; frame-src 'none'";

pub fn cors(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins()
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(origin = %o, error = %e, "skipping unusable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

pub fn security_headers() -> Vec<SetResponseHeaderLayer<HeaderValue>> {
    [
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (header::X_FRAME_OPTIONS, "DENY"),
        (header::REFERRER_POLICY, "no-referrer"),
        (header::CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY),
        (HeaderName::from_static("cross-origin-opener-policy"), "same-origin"),
    ]
    .into_iter()
    .map(|(name, value)| {
        SetResponseHeaderLayer::if_not_present(name, HeaderValue::from_static(value))
    })
    .collect()
}

/// Fixed-window request counter keyed by client IP.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    hits: Mutex<HashMap<IpAddr, (Instant, u32)>>,
}

impl RateLimiter {
    pub fn new(cfg: &RateLimitConfig) -> Self {
        Self {
            max_requests: cfg.max_requests,
            window: Duration::from_secs(cfg.window_secs),
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Records a hit and reports whether it is still within the budget.
    pub fn check(&self, ip: IpAddr, now: Instant) -> bool {
        let mut hits = match self.hits.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        // drop windows that have already closed
        let window = self.window;
        hits.retain(|_, (start, _)| now.duration_since(*start) < window);

        let entry = hits.entry(ip).or_insert((now, 0));
        entry.1 += 1;
        entry.1 <= self.max_requests
    }
}

pub async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    // in-process callers (tests) carry no peer address
    let ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or(IpAddr::V4(Ipv4Addr::LOCALHOST), |ConnectInfo(addr)| addr.ip());

    if !state.limiter.check(ip, Instant::now()) {
        warn!(%ip, "rate limit exceeded");
        return ApiError::TooManyRequests {
            error: "Demasiadas solicitudes".into(),
            message: "Has superado el límite de solicitudes, inténtalo más tarde".into(),
        }
        .into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max: u32, secs: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            max_requests: max,
            window_secs: secs,
        })
    }

    #[test]
    fn blocks_after_budget() {
        let l = limiter(2, 60);
        let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let now = Instant::now();
        assert!(l.check(ip, now));
        assert!(l.check(ip, now));
        assert!(!l.check(ip, now));
    }

    #[test]
    fn clients_are_counted_separately() {
        let l = limiter(1, 60);
        let now = Instant::now();
        assert!(l.check(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), now));
        assert!(l.check(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)), now));
        assert!(!l.check(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), now));
    }

    #[test]
    fn window_resets() {
        let l = limiter(1, 60);
        let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let start = Instant::now();
        assert!(l.check(ip, start));
        assert!(!l.check(ip, start + Duration::from_secs(30)));
        assert!(l.check(ip, start + Duration::from_secs(61)));
    }
}

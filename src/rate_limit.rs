use axum::Json;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::metrics::{RATE_LIMITED_TOTAL, REQUEST_TOTAL};
use crate::models::ErrorResponse;
use crate::state::AppState;

// Rate limit entry - tracks requests per IP within the current window
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_at: Instant,
}

pub enum RateLimitDecision {
    Allowed,
    Limited { count: u32, retry_after: Duration },
}

// Fixed-window limiter, one entry per client IP. Owned by AppState so tests
// can build their own instance instead of sharing a global table.
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn check(&self, client: &str) -> RateLimitDecision {
        self.check_at(client, Instant::now())
    }

    pub fn check_at(&self, client: &str, now: Instant) -> RateLimitDecision {
        let mut entry = self
            .entries
            .entry(client.to_string())
            .or_insert(RateLimitEntry {
                count: 0,
                reset_at: now + self.window,
            });

        // window expired? restart it
        if now > entry.reset_at {
            entry.count = 1;
            entry.reset_at = now + self.window;
            return RateLimitDecision::Allowed;
        }

        // under the cap? count the request
        if entry.count < self.max_requests {
            entry.count += 1;
            return RateLimitDecision::Allowed;
        }

        RateLimitDecision::Limited {
            count: entry.count,
            retry_after: entry.reset_at.saturating_duration_since(now),
        }
    }

    // drop entries whose window has already ended, so the table stays
    // bounded by the number of clients seen in the last window
    pub fn sweep(&self) {
        self.sweep_at(Instant::now());
    }

    pub fn sweep_at(&self, now: Instant) {
        self.entries.retain(|_, entry| entry.reset_at > now);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

// Runs ahead of every route. Over-limit clients get a 429 with a Retry-After
// hint; the rejection is logged with the offending IP and its count.
pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    REQUEST_TOTAL.inc();

    let ip = addr.ip().to_string();
    match state.rate_limiter.check(&ip) {
        RateLimitDecision::Allowed => next.run(request).await,
        RateLimitDecision::Limited { count, retry_after } => {
            RATE_LIMITED_TOTAL.inc();
            state
                .logger
                .warn("rate limit exceeded", Some(json!({"ip": ip, "count": count})));

            let retry_secs = retry_after.as_secs().max(1).to_string();
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_secs)],
                Json(ErrorResponse {
                    error: "Too many requests".to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max: u32) -> RateLimiter {
        RateLimiter::new(max, Duration::from_secs(60))
    }

    #[test]
    fn allows_up_to_the_cap_then_rejects() {
        let limiter = limiter(100);
        let now = Instant::now();

        for i in 1..=100 {
            assert!(
                matches!(limiter.check_at("10.0.0.1", now), RateLimitDecision::Allowed),
                "request {} should be allowed",
                i
            );
        }

        match limiter.check_at("10.0.0.1", now) {
            RateLimitDecision::Limited { count, retry_after } => {
                assert_eq!(count, 100);
                assert!(retry_after <= Duration::from_secs(60));
            }
            RateLimitDecision::Allowed => panic!("request 101 should be rejected"),
        }
    }

    #[test]
    fn clients_are_tracked_independently() {
        let limiter = limiter(1);
        let now = Instant::now();

        assert!(matches!(limiter.check_at("10.0.0.1", now), RateLimitDecision::Allowed));
        assert!(matches!(limiter.check_at("10.0.0.2", now), RateLimitDecision::Allowed));
        assert!(matches!(
            limiter.check_at("10.0.0.1", now),
            RateLimitDecision::Limited { .. }
        ));
    }

    #[test]
    fn window_resets_strictly_after_it_elapses() {
        let limiter = limiter(1);
        let now = Instant::now();

        assert!(matches!(limiter.check_at("10.0.0.1", now), RateLimitDecision::Allowed));
        assert!(matches!(
            limiter.check_at("10.0.0.1", now),
            RateLimitDecision::Limited { .. }
        ));

        // exactly at the boundary the old window still applies
        let at_reset = now + Duration::from_secs(60);
        assert!(matches!(
            limiter.check_at("10.0.0.1", at_reset),
            RateLimitDecision::Limited { .. }
        ));

        // past the boundary the counter restarts at 1
        let past_reset = now + Duration::from_secs(61);
        assert!(matches!(
            limiter.check_at("10.0.0.1", past_reset),
            RateLimitDecision::Allowed
        ));
    }

    #[test]
    fn sweep_drops_only_expired_entries() {
        let limiter = limiter(10);
        let now = Instant::now();

        limiter.check_at("10.0.0.1", now);
        limiter.check_at("10.0.0.2", now + Duration::from_secs(120));
        assert_eq!(limiter.len(), 2);

        limiter.sweep_at(now + Duration::from_secs(90));
        assert_eq!(limiter.len(), 1);

        limiter.sweep_at(now + Duration::from_secs(300));
        assert_eq!(limiter.len(), 0);
    }
}

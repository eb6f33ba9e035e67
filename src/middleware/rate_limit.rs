use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::middleware::AuthUser;

pub const TOO_MANY_REQUESTS: &str =
    "Too many requests, please try again or contact support if the problem persists";

/// Hits recorded for one key within the current window
struct Bucket {
    hits: VecDeque<Instant>,
    limit: usize,
}

impl Bucket {
    fn expire(&mut self, now: Instant, window: Duration) {
        while self.hits.front().is_some_and(|hit| now.duration_since(*hit) > window) {
            self.hits.pop_front();
        }
    }

    fn exhausted(&self) -> bool {
        self.hits.len() >= self.limit
    }
}

/// Sliding-window request counter shared by every route group
#[derive(Clone)]
pub struct RateLimiter {
    buckets: Arc<Mutex<HashMap<String, Bucket>>>,
    window: Duration,
    max_keys: usize,
}

impl RateLimiter {
    pub fn new(window: Duration, max_keys: usize) -> Self {
        Self {
            buckets: Arc::new(Mutex::new(HashMap::new())),
            window,
            max_keys: max_keys.max(1),
        }
    }

    /// Records a hit for `key` unless it already has `limit` hits in the window.
    /// A limit of zero disables the check.
    pub fn allow(&self, key: &str, limit: u32) -> bool {
        if limit == 0 {
            return true;
        }

        let now = Instant::now();
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);

        if !buckets.contains_key(key) && buckets.len() >= self.max_keys {
            self.make_room(&mut buckets, now);
        }

        let bucket = buckets.entry(key.to_string()).or_insert_with(|| Bucket {
            hits: VecDeque::new(),
            limit: limit as usize,
        });
        bucket.limit = limit as usize;
        bucket.expire(now, self.window);
        if bucket.exhausted() {
            return false;
        }
        bucket.hits.push_back(now);
        true
    }

    /// Drops idle buckets, then the least used ones still under their limit.
    /// Exhausted buckets are never evicted, so the map may exceed `max_keys`
    /// while many clients are being throttled.
    fn make_room(&self, buckets: &mut HashMap<String, Bucket>, now: Instant) {
        buckets.retain(|_, bucket| {
            bucket.expire(now, self.window);
            !bucket.hits.is_empty()
        });
        if buckets.len() < self.max_keys {
            return;
        }

        let mut open: Vec<(usize, String)> = buckets
            .iter()
            .filter(|(_, bucket)| !bucket.exhausted())
            .map(|(key, bucket)| (bucket.hits.len(), key.clone()))
            .collect();
        open.sort();

        let excess = buckets.len() + 1 - self.max_keys;
        for (_, key) in open.into_iter().take(excess) {
            buckets.remove(&key);
        }
    }
}

/// Requests allowed per window, by method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimits {
    pub get: u32,
    pub post: u32,
    pub put: u32,
    pub delete: u32,
    pub other: u32,
}

impl RateLimits {
    /// Applied to every request before routing
    pub const fn root() -> Self {
        Self { get: 240, post: 240, put: 240, delete: 240, other: 60 }
    }

    pub const fn auth() -> Self {
        Self { get: 100, post: 15, put: 30, delete: 30, other: 60 }
    }

    /// user, data-source and console routes
    pub const fn standard() -> Self {
        Self { get: 100, post: 30, put: 30, delete: 30, other: 60 }
    }

    pub fn for_method(&self, method: &Method) -> u32 {
        match *method {
            Method::GET => self.get,
            Method::POST => self.post,
            Method::PUT => self.put,
            Method::DELETE => self.delete,
            _ => self.other,
        }
    }
}

/// Middleware state: one scope of the shared limiter
#[derive(Clone)]
pub struct RateGuard {
    limiter: RateLimiter,
    scope: &'static str,
    limits: RateLimits,
}

impl RateGuard {
    pub fn new(limiter: RateLimiter, scope: &'static str, limits: RateLimits) -> Self {
        Self { limiter, scope, limits }
    }
}

/// Counts the request against its scope. Behind `require_auth` the caller is
/// the verified user; everywhere else it is the client address, since an
/// unverified cookie costs nothing to rotate.
pub async fn enforce_rate_limit(State(guard): State<RateGuard>, request: Request, next: Next) -> Response {
    let client = match request.extensions().get::<AuthUser>() {
        Some(user) => format!("uid-{}", user.uid),
        None => {
            let peer = request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr);
            client_addr(request.headers(), peer)
        }
    };
    let key = format!("{}:{}:{}", guard.scope, request.method(), client);

    if !guard.limiter.allow(&key, guard.limits.for_method(request.method())) {
        tracing::warn!("Rate limit exceeded for {}", key);
        return ApiError::too_many_requests(TOO_MANY_REQUESTS).into_response();
    }

    next.run(request).await
}

/// The first `X-Forwarded-For` hop is trusted (one proxy in front), then the peer.
pub fn client_addr(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

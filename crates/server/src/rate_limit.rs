//! Fixed-window rate limiting keyed by client IP.
//!
//! Requests are counted per key in fixed windows; once the limit is reached
//! the remaining requests in that window get a 429 before the pipeline is
//! ever invoked. The store is an in-process shared counter map.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::http::HeaderMap;

/// Default request limit per window.
pub const DEFAULT_LIMIT: u32 = 5;

/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug)]
struct Store {
    windows: HashMap<String, Window>,
    last_sweep: Instant,
}

/// Shared fixed-window counter store.
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    store: Mutex<Store>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        let store = Store { windows: HashMap::new(), last_sweep: Instant::now() };
        Self { limit, window, store: Mutex::new(store) }
    }

    /// Records a request for `key` and reports whether it is admitted.
    ///
    /// Expired windows reset on the next request for the same key. Keys come
    /// from client-controlled headers, so the map must not grow without
    /// bound: once per window length, expired entries are swept out.
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut store = match self.store.lock() {
            Ok(guard) => guard,
            Err(_) => return true,
        };

        if now.duration_since(store.last_sweep) >= self.window {
            let window = self.window;
            store.windows.retain(|_, w| now.duration_since(w.started) < window);
            store.last_sweep = now;
        }

        let window = store
            .windows
            .entry(key.to_string())
            .or_insert_with(|| Window { started: now, count: 0 });

        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }

        window.count += 1;
        window.count <= self.limit
    }

    /// Liveness of the counter store, reported by the health route.
    pub fn is_healthy(&self) -> bool {
        !self.store.is_poisoned()
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.store.lock().map(|s| s.windows.len()).unwrap_or(0)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, DEFAULT_WINDOW)
    }
}

/// Derives the rate-limit key from request headers.
///
/// Precedence for proxy setups: `cf-connecting-ip`, then the first entry of
/// `x-forwarded-for`, then `x-real-ip`, else "unknown".
pub fn client_key(headers: &HeaderMap) -> String {
    if let Some(ip) = header_str(headers, "cf-connecting-ip") {
        return ip.trim().to_string();
    }
    if let Some(forwarded) = header_str(headers, "x-forwarded-for")
        && let Some(first) = forwarded.split(',').next()
    {
        let first = first.trim();
        if !first.is_empty() {
            return first.to_string();
        }
    }
    if let Some(ip) = header_str(headers, "x-real-ip") {
        return ip.trim().to_string();
    }
    "unknown".to_string()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).filter(|s| !s.trim().is_empty())
}

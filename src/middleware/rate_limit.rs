//! Rate limiting middleware
//!
//! Public write routes are limited per client with a sliding one-minute
//! window plus a small burst allowance. Clients are keyed by peer address.
//! Behind a trusted proxy the first `x-forwarded-for` address, then
//! `x-real-ip`, take precedence.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use crate::config::settings::RateLimitConfig as RateLimitSettings;
use crate::utils::errors::{AceError, Result};

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub max_requests: u32,
    /// Time window duration
    pub window_duration: Duration,
    /// Burst allowance (extra requests allowed in short bursts)
    pub burst_allowance: u32,
    /// Honor forwarding headers when identifying clients
    pub trust_proxy_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 30,
            window_duration: Duration::from_secs(60),
            burst_allowance: 5,
            trust_proxy_headers: false,
        }
    }
}

impl From<&RateLimitSettings> for RateLimitConfig {
    fn from(settings: &RateLimitSettings) -> Self {
        Self {
            max_requests: settings.requests_per_minute,
            window_duration: Duration::from_secs(60),
            burst_allowance: settings.burst,
            trust_proxy_headers: settings.trust_proxy_headers,
        }
    }
}

#[derive(Debug, Clone)]
struct RateLimitEntry {
    requests: Vec<Instant>,
    burst_used: u32,
    last_reset: Instant,
}

impl RateLimitEntry {
    fn new() -> Self {
        Self {
            requests: Vec::new(),
            burst_used: 0,
            last_reset: Instant::now(),
        }
    }

    /// Drop requests that fell out of the window
    fn cleanup(&mut self, window_duration: Duration) {
        let now = Instant::now();
        self.requests.retain(|&time| now.duration_since(time) < window_duration);

        if self.last_reset.elapsed() > window_duration {
            self.burst_used = 0;
            self.last_reset = now;
        }
    }

    fn is_allowed(&mut self, config: &RateLimitConfig) -> bool {
        self.cleanup(config.window_duration);

        if (self.requests.len() as u32) < config.max_requests {
            return true;
        }
        if self.burst_used < config.burst_allowance {
            self.burst_used += 1;
            return true;
        }
        false
    }
}

/// Sliding-window limiter shared by every request
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    entries: Arc<Mutex<HashMap<String, RateLimitEntry>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, RateLimitEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Count a request from `client`, failing once window and burst are used up
    pub fn check(&self, client: &str) -> Result<()> {
        let mut entries = self.entries();
        let entry = entries.entry(client.to_string()).or_insert_with(RateLimitEntry::new);

        if entry.is_allowed(&self.config) {
            entry.requests.push(Instant::now());
            debug!(client = %client, "Rate limit check passed");
            Ok(())
        } else {
            warn!(client = %client, "Rate limit exceeded");
            Err(AceError::RateLimitExceeded)
        }
    }

    /// Requests left in the current window, burst excluded
    pub fn remaining(&self, client: &str) -> u32 {
        let mut entries = self.entries();
        match entries.get_mut(client) {
            Some(entry) => {
                entry.cleanup(self.config.window_duration);
                self.config.max_requests.saturating_sub(entry.requests.len() as u32)
            }
            None => self.config.max_requests,
        }
    }

    /// Forget clients idle for two windows
    pub fn cleanup_old_entries(&self) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        let horizon = self.config.window_duration * 2;
        entries.retain(|_, entry| entry.requests.iter().any(|time| time.elapsed() < horizon));
        debug!(removed = before - entries.len(), remaining_entries = entries.len(), "Cleaned up old rate limit entries");
        before - entries.len()
    }

    pub fn tracked_clients(&self) -> usize {
        self.entries().len()
    }

    /// Prune idle clients once per window for as long as the server runs
    pub fn spawn_cleanup(&self) -> JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(limiter.config.window_duration);
            loop {
                interval.tick().await;
                limiter.cleanup_old_entries();
            }
        })
    }

    /// Identify the caller of a request
    pub fn client_key(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
        client_key(headers, peer, self.config.trust_proxy_headers)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

/// Identify the caller for rate limiting
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy_headers: bool) -> String {
    let peer_ip = || peer.map(|addr| addr.ip().to_string());
    if !trust_proxy_headers {
        return peer_ip().unwrap_or_else(|| "unknown".to_string());
    }

    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    header("x-forwarded-for")
        .or_else(|| header("x-real-ip"))
        .or_else(peer_ip)
        .unwrap_or_else(|| "unknown".to_string())
}

/// Axum middleware applying the limiter
pub async fn enforce_rate_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = limiter.client_key(request.headers(), peer);

    limiter.check(&key)?;
    let remaining = limiter.remaining(&key);

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert("x-ratelimit-remaining", HeaderValue::from(remaining));
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, burst_allowance: u32) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests,
            window_duration: Duration::from_secs(60),
            burst_allowance,
            trust_proxy_headers: false,
        })
    }

    #[test]
    fn test_rate_limit_basic() {
        let limiter = limiter(3, 1);

        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(limiter.check("10.0.0.1").is_ok());
        // burst
        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(matches!(limiter.check("10.0.0.1"), Err(AceError::RateLimitExceeded)));

        assert!(limiter.check("10.0.0.2").is_ok());
    }

    #[test]
    fn test_remaining() {
        let limiter = limiter(5, 2);
        assert_eq!(limiter.remaining("10.0.0.1"), 5);

        limiter.check("10.0.0.1").unwrap();
        limiter.check("10.0.0.1").unwrap();
        assert_eq!(limiter.remaining("10.0.0.1"), 3);

        assert_eq!(limiter.remaining("10.0.0.2"), 5);
    }

    #[test]
    fn test_cleanup_forgets_idle_clients() {
        let limiter = RateLimiter::new(RateLimitConfig {
            max_requests: 2,
            window_duration: Duration::from_millis(10),
            burst_allowance: 0,
            trust_proxy_headers: false,
        });
        for i in 0..50 {
            limiter.check(&format!("10.0.1.{}", i)).unwrap();
        }
        assert_eq!(limiter.tracked_clients(), 50);
        assert_eq!(limiter.cleanup_old_entries(), 0);

        std::thread::sleep(Duration::from_millis(30));
        limiter.check("10.0.2.1").unwrap();
        assert_eq!(limiter.cleanup_old_entries(), 50);
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[tokio::test]
    async fn test_background_cleanup_prunes() {
        let limiter = RateLimiter::new(RateLimitConfig {
            max_requests: 2,
            window_duration: Duration::from_millis(10),
            burst_allowance: 0,
            trust_proxy_headers: false,
        });
        limiter.check("10.0.3.1").unwrap();
        let task = limiter.spawn_cleanup();

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(limiter.tracked_clients(), 0);
        task.abort();
    }

    #[test]
    fn test_client_key_behind_proxy() {
        let mut headers = HeaderMap::new();
        let peer: SocketAddr = "192.168.1.9:5000".parse().unwrap();
        assert_eq!(client_key(&headers, Some(peer), true), "192.168.1.9");
        assert_eq!(client_key(&headers, None, true), "unknown");

        headers.insert("x-real-ip", HeaderValue::from_static("172.16.0.4"));
        assert_eq!(client_key(&headers, Some(peer), true), "172.16.0.4");

        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        assert_eq!(client_key(&headers, Some(peer), true), "203.0.113.7");
    }

    #[test]
    fn test_forwarding_headers_ignored_by_default() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7"));
        headers.insert("x-real-ip", HeaderValue::from_static("172.16.0.4"));
        let peer: SocketAddr = "192.168.1.9:5000".parse().unwrap();

        assert_eq!(client_key(&headers, Some(peer), false), "192.168.1.9");
        assert_eq!(client_key(&headers, None, false), "unknown");
    }
}

use anyhow::Context;
use chrono::Utc;
use derive_more::Constructor;
use log::debug;
use log::info;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use std::cmp::Ordering;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::Mutex;

/// Primary GraphQL budget of a personal access token, used until the first response arrives.
const DEFAULT_LIMIT: u32 = 5000;

#[derive(Constructor, Debug)]
pub struct RateLimit {
    limit: u32,
    remaining: u32,
    reset: i64,
}

pub struct RateLimiter {
    limit: Mutex<RateLimit>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        RateLimiter::new(RateLimit::new(DEFAULT_LIMIT, DEFAULT_LIMIT, 0))
    }
}

impl RateLimiter {
    pub fn new(limit: RateLimit) -> Self {
        RateLimiter {
            limit: Mutex::new(limit),
        }
    }

    pub(crate) async fn wait(&self) {
        while let Some(delay) = self.time_to_wait().await {
            info!("Rate limiting wait: {} sec", delay.as_secs());
            tokio::time::sleep(delay).await;
        }
    }

    async fn time_to_wait(&self) -> Option<Duration> {
        let mut rate_limit = self.limit.lock().await;
        if rate_limit.remaining > 0 {
            debug!("Remaining limit {}. Not waiting.", rate_limit.remaining);
            rate_limit.remaining -= 1;
            return None;
        }
        let now = Utc::now().timestamp();
        if rate_limit.reset < now {
            debug!("Old reset. Resetting remaining to limit.");
            rate_limit.remaining = rate_limit.limit.saturating_sub(1);
            return None;
        }
        Some(Duration::from_secs((rate_limit.reset - now) as u64 + 1))
    }

    /// Updates the budget from the `x-ratelimit-*` headers of a response.
    pub(crate) async fn reset_limiter(&self, headers: &HeaderMap<HeaderValue>) -> anyhow::Result<()> {
        let limit = read_header::<u32>(headers, "x-ratelimit-limit")?;
        let remaining = read_header::<u32>(headers, "x-ratelimit-remaining")?;
        let reset = read_header::<i64>(headers, "x-ratelimit-reset")?;
        let mut rate_limit = self.limit.lock().await;
        rate_limit.limit = limit;
        match reset.cmp(&rate_limit.reset) {
            // A later reset opens a new window with a fresh budget.
            Ordering::Greater => {
                rate_limit.remaining = remaining;
                rate_limit.reset = reset;
            }
            // Parallel requests may answer out of order, keep the lowest budget of the window.
            Ordering::Equal => rate_limit.remaining = std::cmp::min(remaining, rate_limit.remaining),
            // Late response from a previous window.
            Ordering::Less => {}
        }
        debug!("Updated limits: {:?}", rate_limit);
        Ok(())
    }
}

fn read_header<T>(headers: &HeaderMap<HeaderValue>, header: &str) -> anyhow::Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    let value = headers
        .get(header)
        .with_context(|| format!("Header {} not found", header))?
        .to_str()?;
    value
        .parse::<T>()
        .with_context(|| format!("Header {} has invalid value {}", header, value))
}

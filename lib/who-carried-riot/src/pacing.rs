use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Waits, if needed, before the next upstream call.
pub trait Pacer {
    async fn pace(&self);

    /// One-off pause outside the regular pacing.
    async fn hold(&self, duration: Duration) {
        if !duration.is_zero() {
            debug!("Holding for {duration:?}");
            tokio::time::sleep(duration).await;
        }
    }
}

/// Sleep a constant delay before every call.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Pacer for FixedDelay {
    async fn pace(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[derive(Debug)]
struct Bucket {
    tokens: u32,
    refilled_at: Instant,
}

/// Allows bursts of up to `capacity` calls, then one call per `refill`.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: u32,
    refill: Duration,
    bucket: Mutex<Bucket>,
}

impl TokenBucket {
    pub fn new(capacity: u32, refill: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            refill,
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                refilled_at: Instant::now(),
            }),
        }
    }
}

impl Pacer for TokenBucket {
    async fn pace(&self) {
        let mut bucket = self.bucket.lock().await;
        if self.refill.is_zero() {
            return;
        }

        let elapsed = bucket.refilled_at.elapsed();
        let earned = (elapsed.as_nanos() / self.refill.as_nanos()).min(u128::from(self.capacity));
        if earned > 0 {
            // Bounded by capacity above
            let earned = earned as u32;
            bucket.tokens = (bucket.tokens + earned).min(self.capacity);
            bucket.refilled_at += self.refill * earned;
            if bucket.tokens == self.capacity {
                bucket.refilled_at = Instant::now();
            }
        }

        if bucket.tokens == 0 {
            let wake = bucket.refilled_at + self.refill;
            debug!(
                "Token bucket empty, waiting {:?}",
                wake.saturating_duration_since(Instant::now())
            );
            tokio::time::sleep_until(wake).await;
            bucket.refilled_at = wake;
        } else {
            bucket.tokens -= 1;
        }
    }
}

/// Pacing policy selected in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PacingPolicy {
    #[default]
    Fixed,
    TokenBucket,
}

#[derive(Debug)]
pub enum AnyPacer {
    Fixed(FixedDelay),
    TokenBucket(TokenBucket),
}

impl AnyPacer {
    /// Build the configured policy. A token bucket bursts up to `burst` calls
    /// and then refills one token per `interval`.
    pub fn new(policy: PacingPolicy, interval: Duration, burst: u32) -> Self {
        match policy {
            PacingPolicy::Fixed => AnyPacer::Fixed(FixedDelay::new(interval)),
            PacingPolicy::TokenBucket => AnyPacer::TokenBucket(TokenBucket::new(burst, interval)),
        }
    }
}

impl Pacer for AnyPacer {
    async fn pace(&self) {
        match self {
            AnyPacer::Fixed(pacer) => pacer.pace().await,
            AnyPacer::TokenBucket(pacer) => pacer.pace().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The paused clock may round timers up to the next millisecond tick
    fn assert_waited(start: Instant, expected: Duration) {
        let elapsed = start.elapsed();
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(5),
            "waited {elapsed:?}, expected {expected:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay() {
        let pacer = FixedDelay::new(Duration::from_millis(50));
        let start = Instant::now();
        pacer.pace().await;
        pacer.pace().await;
        assert_waited(start, Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_bucket_burst_then_wait() {
        let pacer = TokenBucket::new(2, Duration::from_millis(100));
        let start = Instant::now();

        pacer.pace().await;
        pacer.pace().await;
        assert_waited(start, Duration::ZERO);

        pacer.pace().await;
        assert_waited(start, Duration::from_millis(100));

        pacer.pace().await;
        assert_waited(start, Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_bucket_refills_while_idle() {
        let pacer = TokenBucket::new(2, Duration::from_millis(100));
        pacer.pace().await;
        pacer.pace().await;

        tokio::time::sleep(Duration::from_millis(250)).await;
        let start = Instant::now();
        pacer.pace().await;
        pacer.pace().await;
        assert_waited(start, Duration::ZERO);

        pacer.pace().await;
        assert_waited(start, Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hold_does_not_spend_tokens() {
        let pacer = TokenBucket::new(1, Duration::from_millis(100));
        let start = Instant::now();
        pacer.hold(Duration::from_millis(30)).await;
        assert_waited(start, Duration::from_millis(30));

        let start = Instant::now();
        pacer.pace().await;
        assert_waited(start, Duration::ZERO);
    }
}

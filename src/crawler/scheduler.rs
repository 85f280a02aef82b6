//! Fetch pacing
//!
//! A single global limiter: fetch starts are spaced at least `page_delay`
//! apart no matter how many pages are in flight.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Global minimum-interval limiter shared by all page fetches
#[derive(Debug)]
pub struct FetchScheduler {
    min_interval: Duration,
    last_start: Mutex<Option<Instant>>,
}

impl FetchScheduler {
    /// Creates a scheduler with the given minimum interval between fetch starts
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_start: Mutex::new(None),
        }
    }

    /// Creates a scheduler from a delay in milliseconds
    pub fn from_millis(page_delay: u64) -> Self {
        Self::new(Duration::from_millis(page_delay))
    }

    /// Waits until the next fetch may start, then claims the slot
    ///
    /// The lock is held while sleeping so waiters queue up in order.
    pub async fn acquire(&self) {
        let mut last = self.last_start.lock().await;

        if let Some(previous) = *last {
            let ready_at = previous + self.min_interval;
            let now = Instant::now();
            if ready_at > now {
                tracing::trace!("Pacing fetch for {:?}", ready_at - now);
                tokio::time::sleep_until(ready_at).await;
            }
        }

        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_acquire_is_immediate() {
        let scheduler = FetchScheduler::from_millis(1000);
        let start = Instant::now();
        scheduler.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquires_are_spaced() {
        let scheduler = FetchScheduler::from_millis(500);
        let start = Instant::now();
        scheduler.acquire().await;
        scheduler.acquire().await;
        scheduler.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_acquires_are_spaced() {
        let scheduler = FetchScheduler::from_millis(200);
        let start = Instant::now();
        tokio::join!(scheduler.acquire(), scheduler.acquire(), scheduler.acquire());
        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_never_waits() {
        let scheduler = FetchScheduler::from_millis(0);
        let start = Instant::now();
        for _ in 0..5 {
            scheduler.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}

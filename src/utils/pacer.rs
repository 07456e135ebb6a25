//! Inter-request pacing for the quote API - a fixed gap between consecutive fetches

use std::time::Duration;

use tokio::time::Instant;

pub struct Pacer {
    /// Minimum gap between the end of one fetch and the start of the next
    delay: Duration,
    /// When the previous fetch finished
    last_finished: Option<Instant>,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_finished: None,
        }
    }

    /// How long to wait at `now` before the next fetch may start
    fn wait_time(&self, now: Instant) -> Duration {
        match self.last_finished {
            Some(finished) => self.delay.saturating_sub(now.duration_since(finished)),
            None => Duration::ZERO,
        }
    }

    /// Wait if necessary so the next fetch respects the delay
    pub async fn wait(&self) {
        let wait_duration = self.wait_time(Instant::now());
        if !wait_duration.is_zero() {
            tracing::debug!("Quote API pacing: waiting {}ms", wait_duration.as_millis());
            tokio::time::sleep(wait_duration).await;
        }
    }

    /// Record that a fetch just finished
    pub fn record(&mut self) {
        self.last_finished = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_request_does_not_wait() {
        let pacer = Pacer::new(Duration::from_millis(200));
        let start = Instant::now();
        pacer.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_request_waits_full_delay() {
        let mut pacer = Pacer::new(Duration::from_millis(200));
        pacer.record();
        assert_eq!(pacer.wait_time(Instant::now()), Duration::from_millis(200));

        let start = Instant::now();
        pacer.wait().await;
        assert_eq!(start.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_time_counts_toward_delay() {
        let mut pacer = Pacer::new(Duration::from_millis(200));
        pacer.record();
        tokio::time::advance(Duration::from_millis(150)).await;
        assert_eq!(pacer.wait_time(Instant::now()), Duration::from_millis(50));

        tokio::time::advance(Duration::from_millis(100)).await;
        assert_eq!(pacer.wait_time(Instant::now()), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_never_waits() {
        let mut pacer = Pacer::new(Duration::ZERO);
        pacer.record();
        let start = Instant::now();
        pacer.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}

use std::time::Duration;
use tokio::time::Instant;

/// Fixed minimum-interval pacing between outbound API calls. Not adaptive,
/// not backpressure-aware: sleep for whatever remains of the interval since
/// the previous call, then stamp the clock.
pub struct RateGate {
    min_interval: Duration,
    last: Option<Instant>,
}

impl RateGate {
    pub fn new(min_interval: Duration) -> Self {
        Self { min_interval, last: None }
    }

    pub async fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let pause = self.min_interval - elapsed;
                tracing::debug!(?pause, "rate gate: pausing before next request");
                tokio::time::sleep(pause).await;
            }
        }
        self.last = Some(Instant::now());
    }
}

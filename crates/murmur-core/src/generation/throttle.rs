//! Minimum spacing between outbound requests from one client.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Enforces a minimum interval between consecutive requests.
///
/// The lock is held across the wait, so concurrent callers queue up and
/// leave one interval apart.
#[derive(Debug)]
pub struct RequestThrottle {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until a request may be sent, then record it. Returns the wait.
    pub async fn acquire(&self) -> Duration {
        let mut last = self.last_request.lock().await;
        let waited = match *last {
            Some(previous) => {
                let ready_at = previous + self.min_interval;
                let now = Instant::now();
                if ready_at > now {
                    let wait = ready_at - now;
                    debug!(wait_ms = wait.as_millis() as u64, "throttling request");
                    tokio::time::sleep_until(ready_at).await;
                    wait
                } else {
                    Duration::ZERO
                }
            }
            None => Duration::ZERO,
        };
        *last = Some(Instant::now());
        waited
    }
}

//! Request pacing against the NCBI rate ceiling.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Width of the rolling window the ceiling applies to
const WINDOW: Duration = Duration::from_secs(1);

/// How long to wait before rechecking a saturated window
const RECHECK_INTERVAL: Duration = Duration::from_millis(100);

/// Sliding-window request gate.
///
/// `acquire` completes only when dispatching one more request keeps the
/// count inside any trailing one-second window at or below the configured
/// ceiling. Dispatch timestamps are recorded at acquire time and evicted
/// once they age out of the window. There is no fairness guarantee beyond
/// eventual retry; one caller per job is the expected shape.
#[derive(Debug)]
pub struct RequestGate {
    max_per_window: usize,
    stamps: Mutex<VecDeque<Instant>>,
}

impl RequestGate {
    /// Create a gate admitting at most `max_per_window` dispatches per
    /// rolling second
    pub fn new(max_per_window: usize) -> Self {
        Self {
            max_per_window: max_per_window.max(1),
            stamps: Mutex::new(VecDeque::new()),
        }
    }

    /// Wait until one more request may be dispatched, then record it
    pub async fn acquire(&self) {
        loop {
            {
                let mut stamps = self.stamps.lock().unwrap();
                let now = Instant::now();
                if let Some(cutoff) = now.checked_sub(WINDOW) {
                    while stamps.front().is_some_and(|t| *t <= cutoff) {
                        stamps.pop_front();
                    }
                }
                if stamps.len() < self.max_per_window {
                    stamps.push_back(now);
                    return;
                }
            }
            sleep(RECHECK_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_burst_is_immediate() {
        let gate = RequestGate::new(3);
        let start = Instant::now();
        for _ in 0..3 {
            gate.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fourth_request_waits_for_window() {
        let gate = RequestGate::new(3);
        for _ in 0..3 {
            gate.acquire().await;
        }
        let start = Instant::now();
        gate.acquire().await;
        // The oldest stamp ages out after one second; the recheck cadence
        // rounds the wait up to the next 100 ms boundary.
        assert!(start.elapsed() >= Duration::from_secs(1));
        assert!(start.elapsed() <= Duration::from_millis(1200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_trailing_window_exceeds_ceiling() {
        let gate = RequestGate::new(3);
        let mut dispatched = Vec::new();
        for _ in 0..10 {
            gate.acquire().await;
            dispatched.push(Instant::now());
        }
        for pair in dispatched.windows(4) {
            assert!(
                pair[3].duration_since(pair[0]) >= WINDOW,
                "four dispatches inside one second"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ceiling_is_clamped_to_one() {
        let gate = RequestGate::new(0);
        gate.acquire().await;
        let start = Instant::now();
        gate.acquire().await;
        assert!(start.elapsed() >= WINDOW);
    }
}

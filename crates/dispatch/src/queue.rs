//! Dispatch Queue (component H): bounded concurrency plus a minimum inter-departure
//! spacing, so the gateway never hammers the upstream provider faster than it can take.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

pub struct DispatchQueue {
    semaphore: Arc<Semaphore>,
    last_departure: Arc<Mutex<Option<Instant>>>,
    min_spacing: Duration,
    max_concurrent: usize,
}

impl DispatchQueue {
    pub fn new(max_concurrent: usize, min_spacing: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            last_departure: Arc::new(Mutex::new(None)),
            min_spacing,
            max_concurrent,
        }
    }

    /// Wait for a concurrency slot and the minimum spacing since the previous
    /// departure, in FIFO order. Cancelling the returned future (e.g. because the
    /// client disconnected) withdraws the waiter without ever occupying a slot.
    pub async fn acquire(&self) -> DispatchPermit {
        let permit = self.semaphore.clone().acquire_owned().await.expect("semaphore is never closed");

        let mut last = self.last_departure.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_spacing {
                tokio::time::sleep(self.min_spacing - elapsed).await;
            }
        }
        *last = Some(Instant::now());

        DispatchPermit { _permit: permit }
    }

    /// Slots not currently occupied by an in-flight call.
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn in_flight(&self) -> usize {
        self.max_concurrent - self.available_permits()
    }
}

/// Held for the duration of one upstream call; dropping it frees the concurrency slot.
pub struct DispatchPermit {
    _permit: OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration as StdDuration;

    #[tokio::test]
    async fn i8_admits_at_most_n_concurrent_calls() {
        let queue = Arc::new(DispatchQueue::new(2, StdDuration::from_millis(0)));
        let concurrent = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let queue = queue.clone();
            let concurrent = concurrent.clone();
            let max_seen = max_seen.clone();
            handles.push(tokio::spawn(async move {
                let _permit = queue.acquire().await;
                let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(StdDuration::from_millis(20)).await;
                concurrent.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(max_seen.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn i8_enforces_minimum_spacing_between_departures() {
        let queue = DispatchQueue::new(4, StdDuration::from_millis(200));

        let first = Instant::now();
        drop(queue.acquire().await);
        let second_permit = queue.acquire().await;
        let elapsed = first.elapsed();

        assert!(elapsed >= StdDuration::from_millis(200));
        drop(second_permit);
    }

    #[tokio::test]
    async fn cancelled_waiter_does_not_occupy_a_slot() {
        let queue = Arc::new(DispatchQueue::new(1, StdDuration::from_millis(0)));
        let held = queue.acquire().await;

        let queue_clone = queue.clone();
        let waiter = tokio::spawn(async move {
            let _permit = queue_clone.acquire().await;
        });
        tokio::time::sleep(StdDuration::from_millis(10)).await;
        waiter.abort();
        let _ = waiter.await;

        drop(held);
        assert_eq!(queue.available_permits(), 1);
    }
}

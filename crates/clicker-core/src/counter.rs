//! The process-wide click counter.
//!
//! [`SharedCounter`] is a lock-free [`AtomicU64`]. It starts at zero,
//! only ever goes up, and is never persisted: a restart resets it.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic, non-negative click counter shared by all sessions.
///
/// Increments are linearizable: after `N` successful calls to
/// [`increment`](Self::increment) from any number of tasks, the value
/// is exactly `N` higher.
#[derive(Debug, Default)]
pub struct SharedCounter {
    value: AtomicU64,
}

impl SharedCounter {
    /// Create a counter starting at zero.
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create a counter starting at an arbitrary value.
    pub const fn starting_at(value: u64) -> Self {
        Self {
            value: AtomicU64::new(value),
        }
    }

    /// Add one and return the new value.
    ///
    /// Saturates at [`u64::MAX`] instead of wrapping so the value stays
    /// monotonic.
    pub fn increment(&self) -> u64 {
        let previous = self
            .value
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| {
                Some(v.saturating_add(1))
            })
            .unwrap_or_else(|v| v);
        previous.saturating_add(1)
    }

    /// Current value, without mutation.
    pub fn current(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn starts_at_zero() {
        let counter = SharedCounter::new();
        assert_eq!(counter.current(), 0);
    }

    #[test]
    fn increment_returns_new_value() {
        let counter = SharedCounter::new();
        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.increment(), 2);
        assert_eq!(counter.current(), 2);
    }

    #[test]
    fn saturates_at_max() {
        let counter = SharedCounter::starting_at(u64::MAX);
        assert_eq!(counter.increment(), u64::MAX);
        assert_eq!(counter.current(), u64::MAX);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_are_not_lost() {
        let counter = Arc::new(SharedCounter::new());
        let mut handles = Vec::new();

        for _ in 0..16 {
            let counter = Arc::clone(&counter);
            handles.push(tokio::spawn(async move {
                for _ in 0..500 {
                    counter.increment();
                    tokio::task::yield_now().await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(counter.current(), 8000);
    }

    #[test]
    fn increments_from_threads_return_distinct_values() {
        let counter = Arc::new(SharedCounter::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                std::thread::spawn(move || (0..100).map(|_| counter.increment()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        seen.sort_unstable();
        let expected: Vec<u64> = (1..=800).collect();
        assert_eq!(seen, expected);
    }
}

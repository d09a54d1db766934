//! Nonces for exchange actions
//!
//! Hyperliquid expects millisecond timestamps close to server time that are
//! unique per signer. Issued values track the wall clock and never repeat.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic millisecond nonce source
#[derive(Debug)]
pub struct NonceCounter {
    last: AtomicU64,
}

impl NonceCounter {
    pub fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Returns `max(last + 1, now_ms)`
    pub fn next(&self) -> u64 {
        let now = now_ms();
        loop {
            let current = self.last.load(Ordering::Acquire);
            let next = current.saturating_add(1).max(now);
            if self
                .last
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return next;
            }
        }
    }
}

impl Default for NonceCounter {
    fn default() -> Self {
        Self::new()
    }
}

fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_nonce_tracks_wall_clock() {
        let counter = NonceCounter::new();
        let before = now_ms();
        let nonce = counter.next();
        assert!(nonce >= before);
    }

    #[test]
    fn test_nonces_strictly_increase() {
        let counter = NonceCounter::new();
        let mut previous = counter.next();
        for _ in 0..1000 {
            let next = counter.next();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn test_nonces_unique_across_threads() {
        let counter = Arc::new(NonceCounter::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let counter = Arc::clone(&counter);
                std::thread::spawn(move || (0..250).map(|_| counter.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for nonce in handle.join().unwrap() {
                assert!(seen.insert(nonce));
            }
        }
        assert_eq!(seen.len(), 1000);
    }
}

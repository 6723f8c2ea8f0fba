//! Round-robin rotation counter.

use std::sync::atomic::{AtomicU64, Ordering};

/// Round-robin selector.
///
/// A single atomically incremented counter: every caller observes a distinct
/// position, so `len` consecutive selections visit every index exactly once
/// regardless of how callers interleave.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicU64,
}

impl RoundRobin {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    /// Claim the next rotation position. Starts at 0.
    pub fn next_position(&self) -> u64 {
        // Uniqueness only needs the RMW itself, no ordering with other memory.
        self.counter.fetch_add(1, Ordering::Relaxed)
    }

    /// Claim the next position and map it onto `0..len`.
    ///
    /// `len` must be non-zero.
    #[allow(clippy::cast_possible_truncation)]
    pub fn next_index(&self, len: usize) -> usize {
        debug_assert!(len > 0, "rotation over an empty registry");
        (self.next_position() % len as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_in_order() {
        let rr = RoundRobin::new();
        let picks: Vec<usize> = (0..7).map(|_| rr.next_index(3)).collect();
        assert_eq!(picks, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn single_slot_always_zero() {
        let rr = RoundRobin::new();
        assert!((0..100).all(|_| rr.next_index(1) == 0));
    }

    #[test]
    fn concurrent_positions_are_unique() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 2_000;

        let rr = RoundRobin::new();
        let mut positions: Vec<u64> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    s.spawn(|| {
                        (0..PER_THREAD)
                            .map(|_| rr.next_position())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        positions.sort_unstable();
        let expected: Vec<u64> = (0..(THREADS * PER_THREAD) as u64).collect();
        assert_eq!(positions, expected);
    }
}

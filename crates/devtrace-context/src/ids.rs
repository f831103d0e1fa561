// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Context id allocation
//!
//! Ids come from an injected generator rather than a process global. Every context created
//! from the same generator gets a distinct id, including under concurrent creation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Process-unique id of a device context
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContextId(pub u32);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Context({})", self.0)
    }
}

/// Monotonic id source shared (via `Arc`) by everything that creates contexts
#[derive(Debug, Default)]
pub struct ContextIdGenerator {
    next: AtomicU32,
}

impl ContextIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(first: u32) -> Self {
        Self {
            next: AtomicU32::new(first),
        }
    }

    /// Claim the next id. Uniqueness only needs atomicity, not ordering with other memory.
    #[inline]
    pub fn next_id(&self) -> ContextId {
        ContextId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Id the next call to [`ContextIdGenerator::next_id`] would return.
    pub fn peek(&self) -> ContextId {
        ContextId(self.next.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_sequential_ids_increase() {
        let ids = ContextIdGenerator::starting_at(10);
        assert_eq!(ids.next_id(), ContextId(10));
        assert_eq!(ids.next_id(), ContextId(11));
        assert_eq!(ids.peek(), ContextId(12));
    }

    #[test]
    fn test_concurrent_ids_are_unique() {
        let ids = Arc::new(ContextIdGenerator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = Arc::clone(&ids);
                thread::spawn(move || (0..500).map(|_| ids.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "{} issued twice", id);
            }
        }
        assert_eq!(seen.len(), 8 * 500);
    }
}

//! Bounded set of already-classified signatures
//!
//! Eviction is all-or-nothing: once the set grows past its capacity it is
//! cleared entirely. De-duplication is therefore approximate; a signature
//! seen before a reset can be classified again afterwards.

use parking_lot::RwLock;
use std::collections::HashSet;

pub struct ProcessedSignatures {
    seen: RwLock<HashSet<String>>,
    capacity: usize,
}

impl ProcessedSignatures {
    pub fn new(capacity: usize) -> Self {
        Self {
            seen: RwLock::new(HashSet::new()),
            capacity,
        }
    }

    pub fn contains(&self, signature: &str) -> bool {
        self.seen.read().contains(signature)
    }

    pub fn mark(&self, signature: &str) {
        self.seen.write().insert(signature.to_string());
    }

    pub fn len(&self) -> usize {
        self.seen.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clear the set if it holds more than `capacity` entries.
    ///
    /// Returns the number of entries dropped (0 when under capacity).
    pub fn enforce_capacity(&self) -> usize {
        let mut seen = self.seen.write();
        if seen.len() > self.capacity {
            let dropped = seen.len();
            seen.clear();
            dropped
        } else {
            0
        }
    }
}

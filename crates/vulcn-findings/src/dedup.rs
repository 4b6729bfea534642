//! Fingerprint-based dedup, shared within a session and across sessions in
//! a scan (spec.md §4.6, testable properties 3 & 7).

use std::collections::HashSet;

use parking_lot::Mutex;

#[derive(Default)]
pub struct Dedup {
    seen: Mutex<HashSet<String>>,
}

impl Dedup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time `fingerprint` is seen, `false` on every
    /// later call with the same fingerprint.
    pub fn insert_if_new(&self, fingerprint: &str) -> bool {
        self.seen.lock().insert(fingerprint.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_fingerprint_only_counts_once() {
        let dedup = Dedup::new();
        assert!(dedup.insert_if_new("a"));
        assert!(!dedup.insert_if_new("a"));
        assert!(dedup.insert_if_new("b"));
        assert_eq!(dedup.len(), 2);
    }
}

//! Byte-bounded distinct string collection grouped by scope

use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

struct Inner {
    scopes: BTreeMap<String, HashSet<String>>,
    data_size: usize,
}

/// A byte-bounded mapping from scope name to a set of distinct strings
///
/// The byte budget is shared across all scopes; only value bytes count
/// against it. A limit of 0 disables the bound.
pub struct ScopedDistinctString {
    inner: Mutex<Inner>,
    exceeded: AtomicBool,
    max_bytes: usize,
}

impl ScopedDistinctString {
    /// Create a collector with the given byte budget, 0 for unbounded.
    pub fn new(max_bytes: usize) -> Self {
        ScopedDistinctString {
            inner: Mutex::new(Inner {
                scopes: BTreeMap::new(),
                data_size: 0,
            }),
            exceeded: AtomicBool::new(false),
            max_bytes,
        }
    }

    /// Add a value under a scope. Returns true if it was stored.
    pub fn collect(&self, scope: &str, value: &str) -> bool {
        let mut inner = self.inner.lock();
        if inner
            .scopes
            .get(scope)
            .is_some_and(|set| set.contains(value))
        {
            return false;
        }
        if self.max_bytes > 0 && inner.data_size + value.len() > self.max_bytes {
            self.exceeded.store(true, Ordering::Release);
            return false;
        }
        inner.data_size += value.len();
        inner
            .scopes
            .entry(scope.to_owned())
            .or_default()
            .insert(value.to_owned());
        true
    }

    /// Whether the byte budget has been hit. Latches true.
    pub fn exceeded(&self) -> bool {
        self.exceeded.load(Ordering::Acquire)
    }

    /// Total bytes of stored values across all scopes.
    pub fn total_data_size(&self) -> usize {
        self.inner.lock().data_size
    }

    /// Extract the collected values: scope name to sorted value list,
    /// scopes in name order.
    pub fn strings(&self) -> BTreeMap<String, Vec<String>> {
        let inner = self.inner.lock();
        inner
            .scopes
            .iter()
            .map(|(scope, set)| {
                let mut vals: Vec<String> = set.iter().cloned().collect();
                vals.sort_unstable();
                (scope.clone(), vals)
            })
            .collect()
    }
}

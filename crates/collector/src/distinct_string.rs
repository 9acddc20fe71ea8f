//! Byte-bounded distinct string collection

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

struct Inner {
    values: HashSet<String>,
    data_size: usize,
}

/// A byte-bounded set of distinct strings
///
/// Once the accumulated byte size of stored values would cross the limit,
/// further values are dropped and [`exceeded`](DistinctString::exceeded)
/// latches true. A limit of 0 disables the bound.
pub struct DistinctString {
    inner: Mutex<Inner>,
    exceeded: AtomicBool,
    max_bytes: usize,
}

impl DistinctString {
    /// Create a collector with the given byte budget, 0 for unbounded.
    pub fn new(max_bytes: usize) -> Self {
        DistinctString {
            inner: Mutex::new(Inner {
                values: HashSet::new(),
                data_size: 0,
            }),
            exceeded: AtomicBool::new(false),
            max_bytes,
        }
    }

    /// Add a value. Returns true if it was stored, false if it was already
    /// present or the budget is spent.
    pub fn collect(&self, value: &str) -> bool {
        let mut inner = self.inner.lock();
        if inner.values.contains(value) {
            return false;
        }
        if self.max_bytes > 0 && inner.data_size + value.len() > self.max_bytes {
            self.exceeded.store(true, Ordering::Release);
            return false;
        }
        inner.data_size += value.len();
        inner.values.insert(value.to_owned());
        true
    }

    /// Whether the byte budget has been hit. Latches true.
    pub fn exceeded(&self) -> bool {
        self.exceeded.load(Ordering::Acquire)
    }

    /// Total bytes of stored values.
    pub fn total_data_size(&self) -> usize {
        self.inner.lock().data_size
    }

    /// Extract the collected values, sorted.
    pub fn strings(&self) -> Vec<String> {
        let inner = self.inner.lock();
        let mut out: Vec<String> = inner.values.iter().cloned().collect();
        out.sort_unstable();
        out
    }
}

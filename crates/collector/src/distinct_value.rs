//! Byte-bounded distinct collection of typed values

use parking_lot::Mutex;
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};

struct Inner<T> {
    values: HashSet<T>,
    data_size: usize,
}

/// A byte-bounded set of distinct typed values
///
/// The caller supplies a sizer that charges each value against the byte
/// budget. `collect` returns true once the budget is spent, which doubles
/// as the stop signal for block callbacks. A limit of 0 disables the
/// bound.
pub struct DistinctValue<T> {
    inner: Mutex<Inner<T>>,
    exceeded: AtomicBool,
    max_bytes: usize,
    size_of: fn(&T) -> usize,
}

impl<T: Eq + Hash + Ord + Clone> DistinctValue<T> {
    /// Create a collector with the given byte budget (0 for unbounded) and
    /// per-value sizer.
    pub fn new(max_bytes: usize, size_of: fn(&T) -> usize) -> Self {
        DistinctValue {
            inner: Mutex::new(Inner {
                values: HashSet::new(),
                data_size: 0,
            }),
            exceeded: AtomicBool::new(false),
            max_bytes,
            size_of,
        }
    }

    /// Add a value. Returns true when the budget is spent and collection
    /// should stop; duplicates are ignored and do not stop collection.
    pub fn collect(&self, value: T) -> bool {
        let mut inner = self.inner.lock();
        if inner.values.contains(&value) {
            return false;
        }
        let size = (self.size_of)(&value);
        if self.max_bytes > 0 && inner.data_size + size > self.max_bytes {
            self.exceeded.store(true, Ordering::Release);
            return true;
        }
        inner.data_size += size;
        inner.values.insert(value);
        false
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
    pub fn values(&self) -> Vec<T> {
        let inner = self.inner.lock();
        let mut out: Vec<T> = inner.values.iter().cloned().collect();
        out.sort_unstable();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn len_sizer(v: &String) -> usize {
        v.len()
    }

    #[test]
    fn test_collect_dedupes() {
        let dv = DistinctValue::new(0, len_sizer);
        assert!(!dv.collect("a".to_string()));
        assert!(!dv.collect("a".to_string()));
        assert_eq!(dv.values(), vec!["a".to_string()]);
    }

    #[test]
    fn test_budget_stops_collection() {
        let dv = DistinctValue::new(2, len_sizer);
        assert!(!dv.collect("ab".to_string()));
        assert!(dv.collect("cd".to_string()));
        assert!(dv.exceeded());
        assert_eq!(dv.values(), vec!["ab".to_string()]);
        assert_eq!(dv.total_data_size(), 2);
    }

    #[test]
    fn test_values_sorted() {
        let dv = DistinctValue::new(0, len_sizer);
        dv.collect("b".to_string());
        dv.collect("a".to_string());
        assert_eq!(dv.values(), vec!["a".to_string(), "b".to_string()]);
    }
}

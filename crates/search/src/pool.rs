//! Small synchronization helpers for the dispatch surfaces

use largo_core::QueryError;
use parking_lot::{Condvar, Mutex};

/// Counting semaphore bounding in-flight work
///
/// `acquire` blocks the scheduling thread once `capacity` permits are out,
/// which is what bounds the typed tag value pool: workers are only spawned
/// while a permit is available, and each worker returns its permit when it
/// finishes.
pub(crate) struct Semaphore {
    capacity: usize,
    in_flight: Mutex<usize>,
    released: Condvar,
}

impl Semaphore {
    pub(crate) fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "semaphore capacity must be positive");
        Semaphore {
            capacity,
            in_flight: Mutex::new(0),
            released: Condvar::new(),
        }
    }

    /// Take a permit, blocking until one is free.
    pub(crate) fn acquire(&self) -> SemaphorePermit<'_> {
        let mut in_flight = self.in_flight.lock();
        while *in_flight >= self.capacity {
            self.released.wait(&mut in_flight);
        }
        *in_flight += 1;
        SemaphorePermit { sem: self }
    }
}

/// Returns its permit on drop
pub(crate) struct SemaphorePermit<'a> {
    sem: &'a Semaphore,
}

impl Drop for SemaphorePermit<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.sem.in_flight.lock();
        *in_flight -= 1;
        self.sem.released.notify_one();
    }
}

/// Last-writer-wins slot for the first-class error of a fan-out
///
/// Parallel workers latch fatal errors here; the dispatcher surfaces one
/// representative error after every worker has drained. When several
/// blocks fail at once the last write wins, which callers accept.
#[derive(Default)]
pub(crate) struct ErrorSlot {
    slot: Mutex<Option<QueryError>>,
}

impl ErrorSlot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn store(&self, err: QueryError) {
        *self.slot.lock() = Some(err);
    }

    pub(crate) fn is_set(&self) -> bool {
        self.slot.lock().is_some()
    }

    pub(crate) fn take(&self) -> Option<QueryError> {
        self.slot.lock().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_semaphore_bounds_concurrency() {
        let sem = Arc::new(Semaphore::new(4));
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..32 {
            let sem = Arc::clone(&sem);
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            handles.push(thread::spawn(move || {
                let _permit = sem.acquire();
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(2));
                active.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 4);
    }

    #[test]
    fn test_permit_returned_on_drop() {
        let sem = Semaphore::new(1);
        drop(sem.acquire());
        // a second acquire must not block
        drop(sem.acquire());
    }

    #[test]
    fn test_error_slot_last_writer_wins() {
        let slot = ErrorSlot::new();
        assert!(!slot.is_set());
        slot.store(QueryError::Storage("first".to_owned()));
        slot.store(QueryError::Storage("second".to_owned()));
        assert!(slot.is_set());
        match slot.take() {
            Some(QueryError::Storage(msg)) => assert_eq!(msg, "second"),
            other => panic!("unexpected slot contents: {other:?}"),
        }
        assert!(slot.take().is_none());
    }
}

//! Trace metadata combination for search results

use largo_core::{TraceId, TraceMetadata};
use std::collections::HashMap;

/// Deduplicating aggregator for trace search results
///
/// Results from many blocks are added one at a time; duplicate trace ids
/// merge into a single entry whose time window widens to cover both
/// sightings. Extraction orders traces most recent first. The combiner is
/// not internally locked; the trace search dispatcher serializes adders
/// behind one mutex.
#[derive(Default)]
pub struct MetadataCombiner {
    by_id: HashMap<TraceId, TraceMetadata>,
}

impl MetadataCombiner {
    /// Create an empty combiner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one trace, merging if its id was already seen.
    pub fn add(&mut self, meta: TraceMetadata) {
        match self.by_id.get_mut(&meta.trace_id) {
            None => {
                self.by_id.insert(meta.trace_id, meta);
            }
            Some(existing) => {
                // Widen the window: earliest start wins, longest duration wins.
                if meta.start_time_unix_nano < existing.start_time_unix_nano {
                    existing.start_time_unix_nano = meta.start_time_unix_nano;
                }
                if meta.duration_ms > existing.duration_ms {
                    existing.duration_ms = meta.duration_ms;
                }
                if existing.root_service_name.is_empty() {
                    existing.root_service_name = meta.root_service_name;
                }
                if existing.root_trace_name.is_empty() {
                    existing.root_trace_name = meta.root_trace_name;
                }
            }
        }
    }

    /// Number of distinct traces collected so far.
    pub fn count(&self) -> usize {
        self.by_id.len()
    }

    /// Extract the collected traces, most recent first. Ties break on
    /// trace id so responses are deterministic.
    pub fn metadata(&self) -> Vec<TraceMetadata> {
        let mut out: Vec<TraceMetadata> = self.by_id.values().cloned().collect();
        out.sort_unstable_by(|a, b| {
            b.start_time_unix_nano
                .cmp(&a.start_time_unix_nano)
                .then_with(|| a.trace_id.cmp(&b.trace_id))
        });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(id: u8, start: u64) -> TraceMetadata {
        let mut bytes = [0u8; 16];
        bytes[15] = id;
        TraceMetadata {
            trace_id: TraceId::from_bytes(bytes),
            root_service_name: format!("svc-{id}"),
            root_trace_name: format!("op-{id}"),
            start_time_unix_nano: start,
            duration_ms: 10,
        }
    }

    #[test]
    fn test_add_and_count() {
        let mut c = MetadataCombiner::new();
        c.add(meta(1, 100));
        c.add(meta(2, 200));
        assert_eq!(c.count(), 2);
    }

    #[test]
    fn test_duplicate_ids_merge() {
        let mut c = MetadataCombiner::new();
        c.add(meta(1, 100));
        c.add(meta(1, 50));
        assert_eq!(c.count(), 1);
        let out = c.metadata();
        assert_eq!(out[0].start_time_unix_nano, 50);
    }

    #[test]
    fn test_merge_keeps_longest_duration() {
        let mut c = MetadataCombiner::new();
        let mut a = meta(1, 100);
        a.duration_ms = 5;
        let mut b = meta(1, 100);
        b.duration_ms = 30;
        c.add(a);
        c.add(b);
        assert_eq!(c.metadata()[0].duration_ms, 30);
    }

    #[test]
    fn test_merge_fills_empty_root_names() {
        let mut c = MetadataCombiner::new();
        let mut a = meta(1, 100);
        a.root_service_name = String::new();
        a.root_trace_name = String::new();
        c.add(a);
        c.add(meta(1, 100));
        let out = c.metadata();
        assert_eq!(out[0].root_service_name, "svc-1");
        assert_eq!(out[0].root_trace_name, "op-1");
    }

    #[test]
    fn test_most_recent_first() {
        let mut c = MetadataCombiner::new();
        c.add(meta(1, 100));
        c.add(meta(2, 300));
        c.add(meta(3, 200));
        let starts: Vec<u64> = c.metadata().iter().map(|m| m.start_time_unix_nano).collect();
        assert_eq!(starts, vec![300, 200, 100]);
    }
}

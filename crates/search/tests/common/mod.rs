//! Configurable in-memory block for integration tests

// each integration test binary compiles this module separately and uses a
// different subset of it
#![allow(dead_code)]

use largo_core::{
    BlockId, QueryContext, QueryError, QueryResult, SearchRequest, SearchResponse, SearchMetrics,
    TagValue, TraceId, TraceMetadata,
};
use largo_query::{
    Attribute, AttributeScope, FetchSpansRequest, FetchSpansResponse, FetchTagValuesRequest,
    FetchTagsRequest, Spanset, TagNamesCallback, TagValuesCallback,
};
use largo_search::{BlockMeta, SearchOptions, Searcher};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// How a mock block responds to every operation.
pub enum Behavior {
    /// Serve the configured data
    Ok,
    /// Signal the operation is not implemented by this block kind
    Unsupported,
    /// Fail with a storage error
    Fail(String),
}

/// An in-memory `Searcher` with canned data and failure modes.
///
/// Each operation bumps the call counter first, so tests can assert that a
/// surface did or did not touch a block. Blocks ignore cancellation unless
/// configured to honor it, mirroring real blocks where mid-block
/// cancellation is implementation-defined.
pub struct MockBlock {
    meta: BlockMeta,
    traces: Vec<TraceMetadata>,
    tags: Vec<(AttributeScope, String)>,
    tag_values: HashMap<String, Vec<String>>,
    typed_values: HashMap<String, Vec<TagValue>>,
    behavior: Behavior,
    delay: Option<Duration>,
    honor_cancel: bool,
    calls: AtomicUsize,
}

impl MockBlock {
    pub fn new() -> Self {
        MockBlock {
            meta: BlockMeta::new(BlockId::new(), 0, 0),
            traces: Vec::new(),
            tags: Vec::new(),
            tag_values: HashMap::new(),
            typed_values: HashMap::new(),
            behavior: Behavior::Ok,
            delay: None,
            honor_cancel: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_window(mut self, start: i64, end: i64) -> Self {
        self.meta.start_time = start;
        self.meta.end_time = end;
        self
    }

    pub fn with_traces(mut self, traces: Vec<TraceMetadata>) -> Self {
        self.traces = traces;
        self
    }

    pub fn with_tags(mut self, tags: &[(AttributeScope, &str)]) -> Self {
        self.tags = tags
            .iter()
            .map(|(scope, tag)| (*scope, (*tag).to_owned()))
            .collect();
        self
    }

    pub fn with_tag_values(mut self, tag_name: &str, values: &[&str]) -> Self {
        self.tag_values.insert(
            tag_name.to_owned(),
            values.iter().map(|v| (*v).to_owned()).collect(),
        );
        self
    }

    pub fn with_typed_values(mut self, tag: &str, values: &[(&str, &str)]) -> Self {
        self.typed_values.insert(
            tag.to_owned(),
            values
                .iter()
                .map(|(kind, value)| TagValue {
                    kind: (*kind).to_owned(),
                    value: (*value).to_owned(),
                })
                .collect(),
        );
        self
    }

    pub fn unsupported(mut self) -> Self {
        self.behavior = Behavior::Unsupported;
        self
    }

    pub fn failing(mut self, msg: &str) -> Self {
        self.behavior = Behavior::Fail(msg.to_owned());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn honoring_cancel(mut self) -> Self {
        self.honor_cancel = true;
        self
    }

    /// How many operations have been invoked on this block.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Common entry bookkeeping for every operation.
    fn touch(&self, ctx: &QueryContext) -> QueryResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.honor_cancel && ctx.is_cancelled() {
            return Err(QueryError::Cancelled);
        }
        match &self.behavior {
            Behavior::Ok => Ok(()),
            Behavior::Unsupported => Err(QueryError::Unsupported),
            Behavior::Fail(msg) => Err(QueryError::Storage(msg.clone())),
        }
    }

    fn response(&self) -> SearchResponse {
        SearchResponse {
            traces: self.traces.clone(),
            metrics: SearchMetrics {
                inspected_traces: self.traces.len() as u32,
                inspected_bytes: self.traces.len() as u64 * 100,
            },
        }
    }
}

impl Searcher for MockBlock {
    fn block_meta(&self) -> &BlockMeta {
        &self.meta
    }

    fn search(
        &self,
        ctx: &QueryContext,
        _req: &SearchRequest,
        _opts: &SearchOptions,
    ) -> QueryResult<SearchResponse> {
        self.touch(ctx)?;
        Ok(self.response())
    }

    fn fetch(
        &self,
        ctx: &QueryContext,
        _req: FetchSpansRequest,
        _opts: &SearchOptions,
    ) -> QueryResult<FetchSpansResponse> {
        self.touch(ctx)?;
        let spansets: Vec<Spanset> = self
            .traces
            .iter()
            .map(|t| Spanset {
                trace_id: t.trace_id,
                root_service_name: t.root_service_name.clone(),
                root_span_name: t.root_trace_name.clone(),
                start_time_unix_nano: t.start_time_unix_nano,
                duration_nanos: u64::from(t.duration_ms) * 1_000_000,
            })
            .collect();
        let bytes = spansets.len() as u64 * 100;
        Ok(FetchSpansResponse::from_spansets(spansets, bytes))
    }

    fn search_tags(
        &self,
        ctx: &QueryContext,
        scope: AttributeScope,
        visit: &mut dyn FnMut(&str, AttributeScope),
        _opts: &SearchOptions,
    ) -> QueryResult<()> {
        self.touch(ctx)?;
        for (tag_scope, tag) in &self.tags {
            if scope == AttributeScope::None || scope == *tag_scope {
                visit(tag, *tag_scope);
            }
        }
        Ok(())
    }

    fn fetch_tag_names(
        &self,
        ctx: &QueryContext,
        req: FetchTagsRequest,
        visit: TagNamesCallback<'_>,
        _opts: &SearchOptions,
    ) -> QueryResult<()> {
        self.touch(ctx)?;
        for (tag_scope, tag) in &self.tags {
            if req.scope == AttributeScope::None || req.scope == *tag_scope {
                if visit(tag, *tag_scope) {
                    break;
                }
            }
        }
        Ok(())
    }

    fn search_tag_values(
        &self,
        ctx: &QueryContext,
        tag_name: &str,
        visit: &mut dyn FnMut(&str),
        _opts: &SearchOptions,
    ) -> QueryResult<()> {
        self.touch(ctx)?;
        if let Some(values) = self.tag_values.get(tag_name) {
            for value in values {
                visit(value);
            }
        }
        Ok(())
    }

    fn search_tag_values_v2(
        &self,
        ctx: &QueryContext,
        tag: &Attribute,
        visit: TagValuesCallback<'_>,
        _opts: &SearchOptions,
    ) -> QueryResult<()> {
        self.touch(ctx)?;
        if let Some(values) = self.typed_values.get(&tag.to_string()) {
            for value in values {
                if visit(value.clone()) {
                    break;
                }
            }
        }
        Ok(())
    }

    fn fetch_tag_values(
        &self,
        ctx: &QueryContext,
        req: FetchTagValuesRequest,
        visit: TagValuesCallback<'_>,
        _opts: &SearchOptions,
    ) -> QueryResult<()> {
        self.touch(ctx)?;
        if let Some(values) = self.typed_values.get(&req.tag.to_string()) {
            for value in values {
                if visit(value.clone()) {
                    break;
                }
            }
        }
        Ok(())
    }
}

/// A trace whose id is `id` and whose start time doubles as recency.
pub fn trace(id: u8, start_nanos: u64) -> TraceMetadata {
    let mut bytes = [0u8; 16];
    bytes[15] = id;
    TraceMetadata {
        trace_id: TraceId::from_bytes(bytes),
        root_service_name: format!("service-{id}"),
        root_trace_name: format!("operation-{id}"),
        start_time_unix_nano: start_nanos,
        duration_ms: 10,
    }
}

/// The trace id produced by [`trace`] for the same `id`.
pub fn trace_id(id: u8) -> TraceId {
    let mut bytes = [0u8; 16];
    bytes[15] = id;
    TraceId::from_bytes(bytes)
}

//! Fetcher abstractions between the engine and per-block primitives
//!
//! Blocks expose raw `fetch*` primitives; the dispatch layer wraps them in
//! these fetcher types so the engine can pull data without knowing block
//! internals. The callback graph is intentionally cyclic: the engine calls
//! the fetcher, the fetcher calls back into the engine's visitor. Both
//! sides are plain function values, so no ownership cycle exists.

use crate::matchers::Matcher;
use crate::scope::AttributeScope;
use crate::attribute::Attribute;
use largo_core::{QueryContext, QueryResult, TagValue, TraceId, TraceMetadata};

/// Spanset fetch request handed to a block
#[derive(Debug, Clone)]
pub struct FetchSpansRequest {
    /// Window start in unix seconds, 0 for unbounded
    pub start: u32,
    /// Window end in unix seconds, 0 for unbounded
    pub end: u32,
    /// Conditions the block applies span-side
    pub conditions: Vec<Matcher>,
}

/// Trace-level summary of one matching spanset
///
/// Span-level evaluation happens inside the block; what crosses the
/// fetcher boundary is the per-trace summary the search response needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanset {
    /// Trace identifier
    pub trace_id: TraceId,
    /// Service name of the root span
    pub root_service_name: String,
    /// Name of the root span
    pub root_span_name: String,
    /// Trace start in unix nanoseconds
    pub start_time_unix_nano: u64,
    /// Trace duration in nanoseconds
    pub duration_nanos: u64,
}

impl Spanset {
    /// Convert to the response-facing trace summary.
    pub fn to_metadata(&self) -> TraceMetadata {
        TraceMetadata {
            trace_id: self.trace_id,
            root_service_name: self.root_service_name.clone(),
            root_trace_name: self.root_span_name.clone(),
            start_time_unix_nano: self.start_time_unix_nano,
            duration_ms: (self.duration_nanos / 1_000_000) as u32,
        }
    }
}

/// Streamed result of a spanset fetch
pub struct FetchSpansResponse {
    results: Box<dyn Iterator<Item = QueryResult<Spanset>> + Send>,
    bytes_read: u64,
}

impl FetchSpansResponse {
    /// Wrap a spanset stream and the number of bytes the block read to
    /// produce it.
    pub fn new(
        results: impl Iterator<Item = QueryResult<Spanset>> + Send + 'static,
        bytes_read: u64,
    ) -> Self {
        FetchSpansResponse {
            results: Box::new(results),
            bytes_read,
        }
    }

    /// Convenience constructor over an in-memory result set.
    pub fn from_spansets(spansets: Vec<Spanset>, bytes_read: u64) -> Self {
        Self::new(spansets.into_iter().map(Ok), bytes_read)
    }

    /// Pull the next spanset.
    pub fn next(&mut self) -> QueryResult<Option<Spanset>> {
        self.results.next().transpose()
    }

    /// Bytes the block read while serving this fetch.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

/// Tag name fetch request handed to a block
#[derive(Debug, Clone)]
pub struct FetchTagsRequest {
    /// Scope constraint for returned tag names
    pub scope: AttributeScope,
    /// Conditions limiting which spans contribute tags
    pub conditions: Vec<Matcher>,
}

/// Typed tag value fetch request handed to a block
#[derive(Debug, Clone)]
pub struct FetchTagValuesRequest {
    /// The tag whose values are enumerated
    pub tag: Attribute,
    /// Conditions limiting which spans contribute values
    pub conditions: Vec<Matcher>,
}

/// Visitor for streamed tag names. Returns true to stop the stream.
pub type TagNamesCallback<'a> = &'a mut dyn FnMut(&str, AttributeScope) -> bool;

/// Visitor for streamed typed tag values. Returns true to stop the stream.
pub type TagValuesCallback<'a> = &'a mut dyn FnMut(TagValue) -> bool;

/// Adapter from the engine's spanset pull to one block's fetch primitive
pub struct SpansetFetcher<'a> {
    #[allow(clippy::type_complexity)]
    fetch: Box<dyn Fn(&QueryContext, FetchSpansRequest) -> QueryResult<FetchSpansResponse> + Send + Sync + 'a>,
}

impl<'a> SpansetFetcher<'a> {
    /// Wrap a per-block fetch function.
    pub fn new(
        fetch: impl Fn(&QueryContext, FetchSpansRequest) -> QueryResult<FetchSpansResponse>
            + Send
            + Sync
            + 'a,
    ) -> Self {
        SpansetFetcher {
            fetch: Box::new(fetch),
        }
    }

    /// Run the fetch.
    pub fn fetch(
        &self,
        ctx: &QueryContext,
        req: FetchSpansRequest,
    ) -> QueryResult<FetchSpansResponse> {
        (self.fetch)(ctx, req)
    }
}

/// Adapter from the engine's tag name stream to one block's fetch primitive
pub struct TagNamesFetcher<'a> {
    #[allow(clippy::type_complexity)]
    fetch: Box<
        dyn Fn(&QueryContext, FetchTagsRequest, TagNamesCallback<'_>) -> QueryResult<()>
            + Send
            + Sync
            + 'a,
    >,
}

impl<'a> TagNamesFetcher<'a> {
    /// Wrap a per-block fetch function.
    pub fn new(
        fetch: impl Fn(&QueryContext, FetchTagsRequest, TagNamesCallback<'_>) -> QueryResult<()>
            + Send
            + Sync
            + 'a,
    ) -> Self {
        TagNamesFetcher {
            fetch: Box::new(fetch),
        }
    }

    /// Run the fetch, streaming names into the visitor.
    pub fn fetch(
        &self,
        ctx: &QueryContext,
        req: FetchTagsRequest,
        visit: TagNamesCallback<'_>,
    ) -> QueryResult<()> {
        (self.fetch)(ctx, req, visit)
    }
}

/// Adapter from the engine's value stream to one block's fetch primitive
pub struct TagValuesFetcher<'a> {
    #[allow(clippy::type_complexity)]
    fetch: Box<
        dyn Fn(&QueryContext, FetchTagValuesRequest, TagValuesCallback<'_>) -> QueryResult<()>
            + Send
            + Sync
            + 'a,
    >,
}

impl<'a> TagValuesFetcher<'a> {
    /// Wrap a per-block fetch function.
    pub fn new(
        fetch: impl Fn(&QueryContext, FetchTagValuesRequest, TagValuesCallback<'_>) -> QueryResult<()>
            + Send
            + Sync
            + 'a,
    ) -> Self {
        TagValuesFetcher {
            fetch: Box::new(fetch),
        }
    }

    /// Run the fetch, streaming values into the visitor.
    pub fn fetch(
        &self,
        ctx: &QueryContext,
        req: FetchTagValuesRequest,
        visit: TagValuesCallback<'_>,
    ) -> QueryResult<()> {
        (self.fetch)(ctx, req, visit)
    }
}

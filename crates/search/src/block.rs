//! The block contract consumed by the search side
//!
//! Blocks are produced and rotated by ingest; search only reads them
//! through the [`Searcher`] capability set. Every method except
//! [`Searcher::block_meta`] defaults to `Unsupported`, which dispatchers
//! treat as "this block kind cannot serve the operation, skip it".

use largo_core::{
    BlockId, QueryContext, QueryError, QueryResult, SearchRequest, SearchResponse,
};
use largo_query::{
    Attribute, AttributeScope, FetchSpansRequest, FetchSpansResponse, FetchTagValuesRequest,
    FetchTagsRequest, TagNamesCallback, TagValuesCallback,
};

/// Identity and time bounds of one block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockMeta {
    /// Block identifier
    pub id: BlockId,
    /// Earliest trace timestamp in the block, unix seconds
    pub start_time: i64,
    /// Latest trace timestamp in the block, unix seconds
    pub end_time: i64,
}

impl BlockMeta {
    /// Create metadata for a block spanning the given window.
    pub fn new(id: BlockId, start_time: i64, end_time: i64) -> Self {
        BlockMeta {
            id,
            start_time,
            end_time,
        }
    }
}

/// Per-call read options handed to every searcher invocation
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Traces to prefetch while scanning
    pub prefetch_trace_count: usize,
    /// Read buffer size in bytes
    pub read_buffer_size: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            prefetch_trace_count: 1000,
            read_buffer_size: 1 << 20,
        }
    }
}

/// Capability set every block exposes to the search side
///
/// The `search*` methods are the native entry points; the `fetch*` methods
/// feed the evaluator. Implementations should observe `ctx` cancellation
/// at convenient points and return [`QueryError::Cancelled`]; dispatchers
/// swallow it.
pub trait Searcher: Send + Sync {
    /// Identity and time bounds of this block.
    fn block_meta(&self) -> &BlockMeta;

    /// Native trace search.
    fn search(
        &self,
        ctx: &QueryContext,
        req: &SearchRequest,
        opts: &SearchOptions,
    ) -> QueryResult<SearchResponse> {
        let _ = (ctx, req, opts);
        Err(QueryError::Unsupported)
    }

    /// Evaluator-facing spanset fetch.
    fn fetch(
        &self,
        ctx: &QueryContext,
        req: FetchSpansRequest,
        opts: &SearchOptions,
    ) -> QueryResult<FetchSpansResponse> {
        let _ = (ctx, req, opts);
        Err(QueryError::Unsupported)
    }

    /// Native tag name enumeration for one scope.
    fn search_tags(
        &self,
        ctx: &QueryContext,
        scope: AttributeScope,
        visit: &mut dyn FnMut(&str, AttributeScope),
        opts: &SearchOptions,
    ) -> QueryResult<()> {
        let _ = (ctx, scope, visit, opts);
        Err(QueryError::Unsupported)
    }

    /// Evaluator-facing tag name fetch.
    fn fetch_tag_names(
        &self,
        ctx: &QueryContext,
        req: FetchTagsRequest,
        visit: TagNamesCallback<'_>,
        opts: &SearchOptions,
    ) -> QueryResult<()> {
        let _ = (ctx, req, visit, opts);
        Err(QueryError::Unsupported)
    }

    /// Native flat tag value enumeration.
    fn search_tag_values(
        &self,
        ctx: &QueryContext,
        tag_name: &str,
        visit: &mut dyn FnMut(&str),
        opts: &SearchOptions,
    ) -> QueryResult<()> {
        let _ = (ctx, tag_name, visit, opts);
        Err(QueryError::Unsupported)
    }

    /// Native typed tag value enumeration.
    fn search_tag_values_v2(
        &self,
        ctx: &QueryContext,
        tag: &Attribute,
        visit: TagValuesCallback<'_>,
        opts: &SearchOptions,
    ) -> QueryResult<()> {
        let _ = (ctx, tag, visit, opts);
        Err(QueryError::Unsupported)
    }

    /// Evaluator-facing typed tag value fetch.
    fn fetch_tag_values(
        &self,
        ctx: &QueryContext,
        req: FetchTagValuesRequest,
        visit: TagValuesCallback<'_>,
        opts: &SearchOptions,
    ) -> QueryResult<()> {
        let _ = (ctx, req, visit, opts);
        Err(QueryError::Unsupported)
    }
}

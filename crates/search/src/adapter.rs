//! Per-block path selection between native and evaluator entry points
//!
//! The adapter is a pure per-block step: it knows nothing about locks or
//! scheduling. Trace search takes the evaluator path when the raw request
//! is a structured expression; tag surfaces take it when the extracted
//! matcher list is non-empty.

use crate::block::{SearchOptions, Searcher};
use largo_core::{QueryContext, QueryResult, SearchRequest, SearchResponse};
use largo_query::{
    is_structured_query, AttributeScope, Attribute, Engine, Matcher, SpansetFetcher,
    TagNamesFetcher, TagValuesCallback, TagValuesFetcher,
};

/// Search one block for traces, picking the native or evaluator path.
pub(crate) fn search_block(
    ctx: &QueryContext,
    req: &SearchRequest,
    block: &dyn Searcher,
    opts: &SearchOptions,
) -> QueryResult<SearchResponse> {
    if is_structured_query(&req.query) {
        let fetcher = SpansetFetcher::new(|ctx: &QueryContext, fetch_req| {
            block.fetch(ctx, fetch_req, opts)
        });
        Engine::new().execute_search(ctx, req, &fetcher)
    } else {
        block.search(ctx, req, opts)
    }
}

/// Enumerate tag names on one block. `visit` returns true to stop.
pub(crate) fn block_tag_names(
    ctx: &QueryContext,
    block: &dyn Searcher,
    scope: AttributeScope,
    matchers: &[Matcher],
    opts: &SearchOptions,
    visit: &mut dyn FnMut(&str, AttributeScope) -> bool,
) -> QueryResult<()> {
    if matchers.is_empty() {
        return block.search_tags(
            ctx,
            scope,
            &mut |tag, tag_scope| {
                let _ = visit(tag, tag_scope);
            },
            opts,
        );
    }

    let fetcher = TagNamesFetcher::new(|ctx: &QueryContext, req, cb| {
        block.fetch_tag_names(ctx, req, cb, opts)
    });
    Engine::new().execute_tag_names(ctx, scope, matchers, visit, &fetcher)
}

/// Enumerate typed values of one tag on one block. `visit` returns true to
/// stop.
pub(crate) fn block_tag_values(
    ctx: &QueryContext,
    block: &dyn Searcher,
    tag: &Attribute,
    matchers: &[Matcher],
    opts: &SearchOptions,
    visit: TagValuesCallback<'_>,
) -> QueryResult<()> {
    if matchers.is_empty() {
        return block.search_tag_values_v2(ctx, tag, visit, opts);
    }

    let fetcher = TagValuesFetcher::new(|ctx: &QueryContext, req, cb| {
        block.fetch_tag_values(ctx, req, cb, opts)
    });
    Engine::new().execute_tag_values(ctx, tag, matchers, visit, &fetcher)
}

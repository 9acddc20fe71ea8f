//! Evaluator entry points
//!
//! The engine executes a matcher list against a single block through a
//! fetcher. It owns no block state and no locks; dispatchers create one
//! per block call.

use crate::attribute::Attribute;
use crate::fetch::{
    FetchSpansRequest, FetchTagValuesRequest, FetchTagsRequest, SpansetFetcher, TagNamesCallback,
    TagNamesFetcher, TagValuesCallback, TagValuesFetcher,
};
use crate::matchers::{extract_matchers, Matcher};
use crate::scope::AttributeScope;
use largo_core::{
    QueryContext, QueryError, QueryResult, SearchMetrics, SearchRequest, SearchResponse,
    DEFAULT_SEARCH_LIMIT,
};

/// Executes structured expressions against one block via fetchers
#[derive(Debug, Default)]
pub struct Engine;

impl Engine {
    /// Create an engine.
    pub fn new() -> Self {
        Engine
    }

    /// Run a structured trace search against one block.
    ///
    /// Pulls spansets up to the request's effective limit and reports how
    /// much the block inspected. Cancellation is honored between pulls.
    pub fn execute_search(
        &self,
        ctx: &QueryContext,
        req: &SearchRequest,
        fetcher: &SpansetFetcher<'_>,
    ) -> QueryResult<SearchResponse> {
        let limit = if req.limit == 0 {
            DEFAULT_SEARCH_LIMIT
        } else {
            req.limit as usize
        };

        let fetch_req = FetchSpansRequest {
            start: req.start,
            end: req.end,
            conditions: extract_matchers(&req.query),
        };
        let mut fetched = fetcher.fetch(ctx, fetch_req)?;

        let mut traces = Vec::new();
        let mut inspected_traces = 0u32;
        while let Some(spanset) = fetched.next()? {
            if ctx.is_cancelled() {
                return Err(QueryError::Cancelled);
            }
            inspected_traces += 1;
            traces.push(spanset.to_metadata());
            if traces.len() >= limit {
                break;
            }
        }

        Ok(SearchResponse {
            traces,
            metrics: SearchMetrics {
                inspected_traces,
                inspected_bytes: fetched.bytes_read(),
            },
        })
    }

    /// Enumerate tag names on one block under a matcher filter.
    ///
    /// Names stream into `visit`; returning true stops the stream, as does
    /// cancellation.
    pub fn execute_tag_names(
        &self,
        ctx: &QueryContext,
        scope: AttributeScope,
        matchers: &[Matcher],
        visit: TagNamesCallback<'_>,
        fetcher: &TagNamesFetcher<'_>,
    ) -> QueryResult<()> {
        let req = FetchTagsRequest {
            scope,
            conditions: matchers.to_vec(),
        };
        fetcher.fetch(ctx, req, &mut |tag, tag_scope| {
            if ctx.is_cancelled() {
                return true;
            }
            visit(tag, tag_scope)
        })
    }

    /// Enumerate typed values of one tag on one block under a matcher
    /// filter.
    pub fn execute_tag_values(
        &self,
        ctx: &QueryContext,
        tag: &Attribute,
        matchers: &[Matcher],
        visit: TagValuesCallback<'_>,
        fetcher: &TagValuesFetcher<'_>,
    ) -> QueryResult<()> {
        let req = FetchTagValuesRequest {
            tag: tag.clone(),
            conditions: matchers.to_vec(),
        };
        fetcher.fetch(ctx, req, &mut |value| {
            if ctx.is_cancelled() {
                return true;
            }
            visit(value)
        })
    }
}

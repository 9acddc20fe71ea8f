//! Trace search: head synchronously, one worker per other block
//!
//! The shared limit is enforced through the combiner: the worker that
//! fills it cancels the request context, and siblings abort as soon as
//! their block observes the cancellation. Results merged before the
//! cancellation are kept.

use crate::adapter;
use crate::block::{SearchOptions, Searcher};
use crate::dispatch::include_block;
use crate::instance::TenantInstance;
use crate::pool::ErrorSlot;
use largo_collector::MetadataCombiner;
use largo_core::{
    CancelGuard, QueryContext, QueryResult, SearchMetrics, SearchRequest, SearchResponse,
    DEFAULT_SEARCH_LIMIT,
};
use parking_lot::Mutex;
use std::thread;
use tracing::{debug_span, error, warn};

struct SearchState {
    combiner: MetadataCombiner,
    metrics: SearchMetrics,
}

impl TenantInstance {
    /// Return the most recent traces matching the request.
    ///
    /// The head block runs synchronously under the head lock, which is
    /// released as soon as its contribution is in. Completing and complete
    /// blocks then run in parallel, one worker each, under the blocks
    /// lock. A fatal error from any block fails the whole request, but
    /// only after every worker has drained.
    pub fn search(&self, ctx: &QueryContext, req: &SearchRequest) -> QueryResult<SearchResponse> {
        let _span = debug_span!("instance_search").entered();

        let ctx = ctx.child();
        let _cancel = CancelGuard::new(ctx.cancel_token().clone());

        let max_results = if req.limit == 0 {
            DEFAULT_SEARCH_LIMIT
        } else {
            req.limit as usize
        };
        let opts = SearchOptions::default();
        let state = Mutex::new(SearchState {
            combiner: MetadataCombiner::new(),
            metrics: SearchMetrics::default(),
        });
        let any_err = ErrorSlot::new();

        let run_block = |block: &dyn Searcher, kind: &'static str| {
            let block_id = block.block_meta().id;
            match adapter::search_block(&ctx, req, block, &opts) {
                Err(err) if err.is_unsupported() => {
                    warn!("block does not support search: block_id={block_id} kind={kind}");
                }
                Err(err) if err.is_cancelled() => {}
                Err(err) => {
                    error!("error searching block: block_id={block_id} kind={kind} err={err}");
                    any_err.store(err.in_block(block_id));
                }
                Ok(resp) => {
                    let mut state = state.lock();
                    state.metrics.merge(&resp.metrics);
                    if state.combiner.count() >= max_results {
                        return;
                    }
                    for trace in resp.traces {
                        state.combiner.add(trace);
                        if state.combiner.count() >= max_results {
                            // enough results, abort the siblings
                            ctx.cancel();
                            return;
                        }
                    }
                }
            }
        };

        // Head block first, synchronously, under its own lock, released as
        // soon as the head contribution is in. Both locks are hard-acquired
        // on this path; the head lock always comes first, here and
        // everywhere else, or rotation will eventually deadlock against a
        // search.
        {
            let head = self.registry().read_head();
            if let Some(head_block) = head.as_ref() {
                if include_block(head_block.block_meta(), req) {
                    run_block(head_block.as_ref(), "head");
                }
            }
        }
        if let Some(err) = any_err.take() {
            return Err(err);
        }

        // All other blocks in parallel. The blocks lock is held until every
        // worker is done; releasing and retaking it would race with
        // rotation.
        let blocks = self.registry().read_blocks();
        thread::scope(|s| {
            let run_block = &run_block;
            for block in &blocks.completing {
                if !include_block(block.block_meta(), req) {
                    continue;
                }
                s.spawn(move || run_block(block.as_ref(), "completing"));
            }
            for block in &blocks.complete {
                if !include_block(block.block_meta(), req) {
                    continue;
                }
                s.spawn(move || run_block(block.as_ref(), "complete"));
            }
        });
        drop(blocks);

        if let Some(err) = any_err.take() {
            return Err(err);
        }

        let state = state.into_inner();
        let mut traces = state.combiner.metadata();
        traces.truncate(max_results);
        Ok(SearchResponse {
            traces,
            metrics: state.metrics,
        })
    }
}

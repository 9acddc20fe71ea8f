//! Tag value enumeration, flat and typed
//!
//! The flat surface is the legacy one: strictly sequential, a plain
//! inspected-block counter, first fatal error ends the walk. The typed
//! surface fans out through a bounded pool; the head task owns the head
//! lock release, the inspected-block counter is atomic, and fatal errors
//! latch into a shared slot while the remaining tasks no-op.

use crate::adapter;
use crate::block::{SearchOptions, Searcher};
use crate::instance::TenantInstance;
use crate::pool::{ErrorSlot, Semaphore};
use largo_collector::{DistinctString, DistinctValue};
use largo_core::{
    CancelGuard, QueryContext, QueryResult, SearchTagValuesRequest, SearchTagValuesResponse,
    SearchTagValuesV2Response, TagValue,
};
use largo_query::{extract_matchers, parse_identifier};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use tracing::{debug_span, error, warn};

/// Width of the worker pool used by the typed surface.
const TAG_VALUES_POOL_WIDTH: usize = 20;

impl TenantInstance {
    /// Enumerate the distinct values of one tag name, untyped.
    pub fn search_tag_values(
        &self,
        ctx: &QueryContext,
        tag_name: &str,
    ) -> QueryResult<SearchTagValuesResponse> {
        let _span = debug_span!("instance_search_tag_values").entered();

        let tenant = ctx.tenant()?;
        let ctx = ctx.child();
        let _cancel = CancelGuard::new(ctx.cancel_token().clone());

        let limit = self.limits().max_bytes_per_tag_values_query(tenant);
        let distinct = DistinctString::new(limit);
        let max_blocks = self.limits().max_blocks_per_tag_values_query(tenant);
        let mut inspected_blocks = 0usize;
        let opts = SearchOptions::default();

        let mut search_block = |block: &dyn Searcher| -> QueryResult<()> {
            if max_blocks > 0 && inspected_blocks >= max_blocks {
                return Ok(());
            }
            if distinct.exceeded() || ctx.is_cancelled() {
                return Ok(());
            }
            inspected_blocks += 1;
            let res = block.search_tag_values(
                &ctx,
                tag_name,
                &mut |value| {
                    distinct.collect(value);
                },
                &opts,
            );
            match res {
                Err(err) if err.is_unsupported() => Ok(()),
                Err(err) if err.is_cancelled() => Ok(()),
                other => other,
            }
        };

        {
            let head = self.registry().read_head();
            if let Some(head_block) = head.as_ref() {
                search_block(head_block.as_ref())
                    .map_err(|err| err.in_block(head_block.block_meta().id))?;
            }
        }

        let blocks = self.registry().read_blocks();
        for block in &blocks.completing {
            search_block(block.as_ref()).map_err(|err| err.in_block(block.block_meta().id))?;
        }
        for block in &blocks.complete {
            search_block(block.as_ref()).map_err(|err| err.in_block(block.block_meta().id))?;
        }
        drop(blocks);

        if distinct.exceeded() {
            warn!(
                "tag values exceeded limit, reduce cardinality or size of tags: tag={tag_name} tenant={tenant} limit={limit} total={}",
                distinct.total_data_size()
            );
        }

        Ok(SearchTagValuesResponse {
            tag_values: distinct.strings(),
        })
    }

    /// Enumerate the distinct typed values of one tag identifier.
    ///
    /// Id-valued intrinsics return an empty response without touching any
    /// block. Work fans out through a pool of bounded width; each task
    /// checks the shared error slot and the inspected-block cap before
    /// doing anything.
    pub fn search_tag_values_v2(
        &self,
        ctx: &QueryContext,
        req: &SearchTagValuesRequest,
    ) -> QueryResult<SearchTagValuesV2Response> {
        let _span = debug_span!("instance_search_tag_values_v2").entered();

        let tenant = ctx.tenant()?;

        let tag = parse_identifier(&req.tag_name)?;
        if tag.is_id_intrinsic() {
            // value enumeration over ids is pointless
            return Ok(SearchTagValuesV2Response::default());
        }

        let ctx = ctx.child();
        let _cancel = CancelGuard::new(ctx.cancel_token().clone());

        let limit = self.limits().max_bytes_per_tag_values_query(tenant);
        let values =
            DistinctValue::new(limit, |v: &TagValue| v.kind.len() + v.value.len());
        let max_blocks = self.limits().max_blocks_per_tag_values_query(tenant);
        let inspected_blocks = AtomicUsize::new(0);
        let matchers = extract_matchers(&req.query);
        let any_err = ErrorSlot::new();
        let pool = Semaphore::new(TAG_VALUES_POOL_WIDTH);
        let opts = SearchOptions::default();

        let run_block = |block: &dyn Searcher, kind: &'static str| {
            if any_err.is_set() {
                return;
            }
            if max_blocks > 0 && inspected_blocks.fetch_add(1, Ordering::Relaxed) + 1 > max_blocks
            {
                return;
            }
            let block_id = block.block_meta().id;
            let res = adapter::block_tag_values(&ctx, block, &tag, &matchers, &opts, &mut |v| {
                values.collect(v)
            });
            match res {
                Ok(()) => {}
                Err(err) if err.is_unsupported() => {
                    warn!("block does not support tag value search: block_id={block_id} kind={kind}");
                }
                Err(err) if err.is_cancelled() => {}
                Err(err) => {
                    error!("error searching block tag values: block_id={block_id} kind={kind} err={err}");
                    any_err.store(err.in_block(block_id));
                }
            }
        };

        // Hard-acquire of both locks, head first. The head task owns the
        // head guard and releases it when it finishes; with no head block
        // the guard is dropped right here and no task is scheduled.
        let head_guard = Some(self.registry().read_head()).filter(|guard| guard.is_some());

        let blocks = self.registry().read_blocks();
        thread::scope(|s| {
            let run_block = &run_block;

            if let Some(guard) = head_guard {
                let permit = pool.acquire();
                s.spawn(move || {
                    let _permit = permit;
                    if let Some(block) = guard.as_ref() {
                        run_block(block.as_ref(), "head");
                    }
                });
            }

            for block in &blocks.complete {
                let permit = pool.acquire();
                s.spawn(move || {
                    let _permit = permit;
                    run_block(block.as_ref(), "complete");
                });
            }
            for block in &blocks.completing {
                let permit = pool.acquire();
                s.spawn(move || {
                    let _permit = permit;
                    run_block(block.as_ref(), "completing");
                });
            }
        });
        drop(blocks);

        if let Some(err) = any_err.take() {
            return Err(err);
        }

        if values.exceeded() {
            warn!(
                "tag values exceeded limit, reduce cardinality or size of tags: tag={} tenant={tenant} limit={limit} total={}",
                req.tag_name,
                values.total_data_size()
            );
        }

        Ok(SearchTagValuesV2Response {
            tag_values: values.values(),
        })
    }
}

//! Tag name enumeration, flat and scoped
//!
//! The scoped surface walks blocks strictly sequentially: collection is
//! byte-bounded, and sequential iteration gives a natural back-pressure
//! point against the budget. The flat surface is a projection of the
//! scoped one.

use crate::adapter;
use crate::block::{SearchOptions, Searcher};
use crate::instance::TenantInstance;
use largo_collector::{DistinctString, ScopedDistinctString};
use largo_core::{
    CancelGuard, QueryContext, QueryError, QueryResult, SearchTagsRequest, SearchTagsResponse,
    SearchTagsV2Response, TagScope, PARAM_SCOPE_INTRINSIC,
};
use largo_query::{extract_matchers, AttributeScope, INTRINSIC_TAGS};
use tracing::{debug_span, warn};

fn intrinsic_scope() -> TagScope {
    TagScope {
        name: PARAM_SCOPE_INTRINSIC.to_owned(),
        tags: INTRINSIC_TAGS.iter().map(|t| (*t).to_owned()).collect(),
    }
}

impl TenantInstance {
    /// Enumerate tag names across all scopes, flattened.
    ///
    /// Projects the scoped search and flattens the result. Intrinsics are
    /// dropped when the caller passed no scope; with an explicit scope the
    /// scoped search never produces them in the first place.
    pub fn search_tags(&self, ctx: &QueryContext, scope: &str) -> QueryResult<SearchTagsResponse> {
        let v2 = self.search_tags_v2(
            ctx,
            &SearchTagsRequest {
                scope: scope.to_owned(),
                query: String::new(),
            },
        )?;

        // the scoped search already enforced the byte budget
        let distinct = DistinctString::new(0);
        for tag_scope in &v2.scopes {
            if scope.is_empty() && tag_scope.name == PARAM_SCOPE_INTRINSIC {
                continue;
            }
            for tag in &tag_scope.tags {
                distinct.collect(tag);
            }
        }

        Ok(SearchTagsResponse {
            tag_names: distinct.strings(),
        })
    }

    /// Enumerate tag names grouped by scope.
    ///
    /// The sentinel scope `intrinsic` short-circuits to the fixed
    /// intrinsic list without touching any block. An unknown scope is a
    /// domain error. The first fatal block error aborts the walk.
    pub fn search_tags_v2(
        &self,
        ctx: &QueryContext,
        req: &SearchTagsRequest,
    ) -> QueryResult<SearchTagsV2Response> {
        let _span = debug_span!("instance_search_tags_v2").entered();

        let tenant = ctx.tenant()?;

        if req.scope == PARAM_SCOPE_INTRINSIC {
            return Ok(SearchTagsV2Response {
                scopes: vec![intrinsic_scope()],
            });
        }
        let scope = AttributeScope::parse(&req.scope);
        if scope == AttributeScope::Unknown {
            return Err(QueryError::UnknownScope(req.scope.clone()));
        }

        let ctx = ctx.child();
        let _cancel = CancelGuard::new(ctx.cancel_token().clone());

        let limit = self.limits().max_bytes_per_tag_values_query(tenant);
        let distinct = ScopedDistinctString::new(limit);
        let matchers = extract_matchers(&req.query);
        let opts = SearchOptions::default();

        let search_block = |block: &dyn Searcher, kind: &'static str| -> QueryResult<()> {
            if distinct.exceeded() || ctx.is_cancelled() {
                return Ok(());
            }
            let mut collect = |tag: &str, tag_scope: AttributeScope| {
                distinct.collect(tag_scope.as_str(), tag);
                distinct.exceeded()
            };
            let res = adapter::block_tag_names(&ctx, block, scope, &matchers, &opts, &mut collect);
            match res {
                Err(err) if err.is_unsupported() => {
                    warn!(
                        "block does not support tag search: block_id={} kind={kind}",
                        block.block_meta().id
                    );
                    Ok(())
                }
                Err(err) if err.is_cancelled() => Ok(()),
                other => other,
            }
        };

        {
            let head = self.registry().read_head();
            if let Some(head_block) = head.as_ref() {
                search_block(head_block.as_ref(), "head")
                    .map_err(|err| err.in_block(head_block.block_meta().id))?;
            }
        }

        let blocks = self.registry().read_blocks();
        for block in &blocks.completing {
            search_block(block.as_ref(), "completing")
                .map_err(|err| err.in_block(block.block_meta().id))?;
        }
        for block in &blocks.complete {
            search_block(block.as_ref(), "complete")
                .map_err(|err| err.in_block(block.block_meta().id))?;
        }
        drop(blocks);

        if distinct.exceeded() {
            warn!(
                "tag names exceeded limit, reduce cardinality or size of tags: tenant={tenant} limit={limit} total={}",
                distinct.total_data_size()
            );
        }

        let mut scopes: Vec<TagScope> = distinct
            .strings()
            .into_iter()
            .map(|(name, tags)| TagScope { name, tags })
            .collect();

        // intrinsics are not stored per block; surface them only for the
        // unconstrained scope
        if scope == AttributeScope::None {
            scopes.push(intrinsic_scope());
        }

        Ok(SearchTagsV2Response { scopes })
    }
}

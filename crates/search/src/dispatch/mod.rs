//! The four dispatch surfaces
//!
//! Each surface follows the same skeleton: derive a cancellable request
//! context, take the head lock and run the head block per policy, take the
//! blocks lock for the rest of the request, schedule work per policy,
//! drain, assemble the response. What differs is the concurrency model and
//! the limit being enforced; see the individual modules.

mod tag_values;
mod tags;
mod trace_search;

use crate::block::BlockMeta;
use largo_core::SearchRequest;

/// Whether a block's time window intersects the request window.
///
/// A zero bound on either side of the request disables time filtering.
/// Comparisons are whole seconds, inclusive on both ends.
pub(crate) fn include_block(meta: &BlockMeta, req: &SearchRequest) -> bool {
    if req.start == 0 || req.end == 0 {
        return true;
    }
    meta.start_time <= i64::from(req.end) && meta.end_time >= i64::from(req.start)
}

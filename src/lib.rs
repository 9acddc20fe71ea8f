//! # Largo
//!
//! The per-tenant search core of a distributed trace ingester. A tenant's
//! traces live in storage blocks that move through three stages: a single
//! in-memory head block, completing blocks flushing out of the wal, and
//! immutable complete blocks. Largo answers four query families over those
//! blocks:
//!
//! - trace search, most recent first with a result limit
//! - tag name enumeration, flat and grouped by scope
//! - tag value enumeration, flat and typed
//!
//! Ingest owns block lifecycles and mutates the registry through its
//! exclusive entry points; search only ever reads under shared locks.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use largo::api::SearchRequest;
//! use largo::{QueryContext, StaticLimits, TenantInstance};
//!
//! fn main() -> largo::QueryResult<()> {
//!     let instance = TenantInstance::new(Arc::new(StaticLimits::default()));
//!     let ctx = QueryContext::for_tenant("tenant-1");
//!
//!     // ingest would install blocks via instance.registry()
//!     let resp = instance.search(&ctx, &SearchRequest::default())?;
//!     assert!(resp.traces.is_empty());
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub use largo_core::api;
pub use largo_core::{
    CancelGuard, CancelToken, QueryContext, QueryError, QueryResult, StaticLimits, TenantLimits,
};
pub use largo_core::{BlockId, TraceId};
pub use largo_search::{BlockMeta, BlockRegistry, SearchOptions, Searcher, TenantInstance};

/// Result collectors shared by the dispatch surfaces.
pub use largo_collector as collector;
/// Query expression model and evaluator surface.
pub use largo_query as query;

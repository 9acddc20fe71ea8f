//! Core types and contracts for the Largo search core
//!
//! This crate defines the foundational types used throughout the system:
//! - BlockId / TraceId: identifier newtypes
//! - Api types: caller-facing request and response contracts
//! - QueryError: the unified error type
//! - TenantLimits: per-tenant query limits consumed by the dispatch layer
//! - QueryContext: tenant identity plus cooperative cancellation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod context;
pub mod error;
pub mod limits;
pub mod types;

// Re-export commonly used types at the crate root
pub use api::{
    SearchMetrics, SearchRequest, SearchResponse, SearchTagValuesRequest,
    SearchTagValuesResponse, SearchTagValuesV2Response, SearchTagsRequest, SearchTagsResponse,
    SearchTagsV2Response, TagScope, TagValue, TraceMetadata, DEFAULT_SEARCH_LIMIT,
    PARAM_SCOPE_INTRINSIC,
};
pub use context::{CancelGuard, CancelToken, QueryContext};
pub use error::{QueryError, QueryResult};
pub use limits::{StaticLimits, TenantLimits};
pub use types::{BlockId, TraceId};

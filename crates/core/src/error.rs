//! Error types for the search core
//!
//! `QueryError` is the unified error type of all search operations. Two
//! variants act as sentinels rather than failures:
//!
//! - `Unsupported`: a block kind does not implement the requested
//!   operation. Dispatchers skip the block with a warning.
//! - `Cancelled`: the request context was cancelled. Never surfaced to
//!   callers; dispatchers swallow it.
//!
//! Fatal block-level errors are wrapped with the block id via
//! [`QueryError::in_block`] before being surfaced.

use crate::types::BlockId;
use thiserror::Error;

/// Result type alias for search operations
pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// Error type for the search core
#[derive(Debug, Error)]
pub enum QueryError {
    /// The block kind does not implement the requested operation
    #[error("operation not supported by this block")]
    Unsupported,

    /// The request context was cancelled
    #[error("query cancelled")]
    Cancelled,

    /// The request carried no tenant identity
    #[error("tenant identity required")]
    TenantRequired,

    /// The requested attribute scope is not recognized
    #[error("unknown scope: {0}")]
    UnknownScope(String),

    /// The tag identifier could not be parsed
    #[error("invalid tag identifier: {0}")]
    InvalidTagName(String),

    /// A block-level failure, annotated with the block id
    #[error("error searching block ({block_id})")]
    Block {
        /// Id of the failing block
        block_id: BlockId,
        /// Underlying failure
        #[source]
        source: Box<QueryError>,
    },

    /// Storage layer failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Bug or invariant violation
    #[error("internal error: {0}")]
    Internal(String),
}

impl QueryError {
    /// Wrap this error with the id of the block it came from.
    pub fn in_block(self, block_id: BlockId) -> Self {
        QueryError::Block {
            block_id,
            source: Box::new(self),
        }
    }

    /// The innermost error, unwrapping any block annotation.
    pub fn root(&self) -> &QueryError {
        match self {
            QueryError::Block { source, .. } => source.root(),
            other => other,
        }
    }

    /// Check whether this is the unsupported-capability sentinel.
    pub fn is_unsupported(&self) -> bool {
        matches!(self.root(), QueryError::Unsupported)
    }

    /// Check whether this is the cancellation sentinel.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.root(), QueryError::Cancelled)
    }
}

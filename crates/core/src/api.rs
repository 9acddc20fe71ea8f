//! Caller-facing request and response contracts
//!
//! These are the wire-facing types of the four search surfaces: trace
//! search, tag name enumeration (flat and scoped), and tag value
//! enumeration (flat and typed).

use crate::types::TraceId;
use serde::{Deserialize, Serialize};

/// Default number of traces returned by a search when the request does not
/// set a limit.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Sentinel scope selecting the fixed intrinsic tag list.
pub const PARAM_SCOPE_INTRINSIC: &str = "intrinsic";

/// A trace search request.
///
/// `start` and `end` are unix seconds; zero means unbounded on that side.
/// A zero `limit` selects [`DEFAULT_SEARCH_LIMIT`]. The query is either
/// empty (match all), a free-form expression handled natively by blocks,
/// or a structured expression handled by the evaluator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Query expression, possibly empty
    pub query: String,
    /// Maximum number of traces to return, 0 for the default
    pub limit: u32,
    /// Window start in unix seconds, 0 for unbounded
    pub start: u32,
    /// Window end in unix seconds, 0 for unbounded
    pub end: u32,
}

/// Summary of one matching trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceMetadata {
    /// Trace identifier
    pub trace_id: TraceId,
    /// Service name of the root span
    pub root_service_name: String,
    /// Name of the root span
    pub root_trace_name: String,
    /// Trace start time in unix nanoseconds
    pub start_time_unix_nano: u64,
    /// Trace duration in milliseconds
    pub duration_ms: u32,
}

/// Counters aggregated across every block that contributed to a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMetrics {
    /// Number of traces inspected
    pub inspected_traces: u32,
    /// Number of bytes read
    pub inspected_bytes: u64,
}

impl SearchMetrics {
    /// Fold another block's counters into this one.
    pub fn merge(&mut self, other: &SearchMetrics) {
        self.inspected_traces += other.inspected_traces;
        self.inspected_bytes += other.inspected_bytes;
    }
}

/// A trace search response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Matching traces, most recent first
    pub traces: Vec<TraceMetadata>,
    /// Aggregated counters
    pub metrics: SearchMetrics,
}

/// A scoped tag name request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchTagsRequest {
    /// Attribute scope to enumerate, empty for all scopes
    pub scope: String,
    /// Optional filter expression
    pub query: String,
}

/// Flat tag name response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchTagsResponse {
    /// Distinct tag names, sorted
    pub tag_names: Vec<String>,
}

/// One scope's worth of tag names in a scoped response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagScope {
    /// Scope name
    pub name: String,
    /// Distinct tag names in the scope, sorted
    pub tags: Vec<String>,
}

/// Scoped tag name response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchTagsV2Response {
    /// Per-scope tag lists
    pub scopes: Vec<TagScope>,
}

/// A typed tag value request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchTagValuesRequest {
    /// Tag identifier, e.g. `.service.name` or `span.http.status_code`
    pub tag_name: String,
    /// Optional filter expression
    pub query: String,
}

/// Flat tag value response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchTagValuesResponse {
    /// Distinct values, sorted
    pub tag_values: Vec<String>,
}

/// A typed tag value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TagValue {
    /// Value type, e.g. "string", "int"
    #[serde(rename = "type")]
    pub kind: String,
    /// Value rendered as a string
    pub value: String,
}

/// Typed tag value response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchTagValuesV2Response {
    /// Distinct typed values
    pub tag_values: Vec<TagValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_merge() {
        let mut m = SearchMetrics {
            inspected_traces: 3,
            inspected_bytes: 100,
        };
        m.merge(&SearchMetrics {
            inspected_traces: 2,
            inspected_bytes: 50,
        });
        assert_eq!(m.inspected_traces, 5);
        assert_eq!(m.inspected_bytes, 150);
    }

    #[test]
    fn test_default_request_is_unbounded() {
        let req = SearchRequest::default();
        assert_eq!(req.limit, 0);
        assert_eq!(req.start, 0);
        assert_eq!(req.end, 0);
        assert!(req.query.is_empty());
    }
}

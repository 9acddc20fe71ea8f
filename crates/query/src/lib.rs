//! Query expression model and evaluator surface
//!
//! This crate holds everything the dispatch layer needs to reason about a
//! query expression without owning block internals:
//!
//! - [`AttributeScope`] and [`Attribute`] identifier parsing, including
//!   the intrinsic identifiers
//! - [`extract_matchers`]: best-effort extraction of a simple matcher
//!   list from a structured expression
//! - fetcher wrappers ([`SpansetFetcher`], [`TagNamesFetcher`],
//!   [`TagValuesFetcher`]) that adapt per-block fetch primitives for the
//!   engine
//! - the [`Engine`], which executes a matcher list against one block
//!   through a fetcher and streams results back through callbacks
//!
//! Span-level evaluation lives inside blocks; the engine consumes
//! trace-level spanset summaries and tag streams.

#![warn(clippy::all)]

pub mod attribute;
pub mod engine;
pub mod fetch;
pub mod matchers;
pub mod scope;

pub use attribute::{parse_identifier, Attribute, Intrinsic, INTRINSIC_TAGS};
pub use engine::Engine;
pub use fetch::{
    FetchSpansRequest, FetchSpansResponse, FetchTagValuesRequest, FetchTagsRequest, Spanset,
    SpansetFetcher, TagNamesCallback, TagNamesFetcher, TagValuesCallback, TagValuesFetcher,
};
pub use matchers::{extract_matchers, is_structured_query, MatchOp, Matcher, StaticValue};
pub use scope::AttributeScope;

//! Result aggregation for the search core
//!
//! Two families of collectors back the search surfaces:
//!
//! - Distinct collectors ([`DistinctString`], [`ScopedDistinctString`],
//!   [`DistinctValue`]) are byte-bounded sets with a one-way `exceeded`
//!   latch. They lock internally, so parallel dispatch surfaces may call
//!   `collect` from many worker threads at once.
//! - The [`MetadataCombiner`] deduplicates trace search results by trace
//!   id and orders them most recent first at extraction. It is not
//!   internally locked; the trace search dispatcher guards it with a
//!   single mutex shared by all workers.

#![warn(clippy::all)]

pub mod distinct_string;
pub mod distinct_value;
pub mod metadata;
pub mod scoped_distinct;

pub use distinct_string::DistinctString;
pub use distinct_value::DistinctValue;
pub use metadata::MetadataCombiner;
pub use scoped_distinct::ScopedDistinctString;

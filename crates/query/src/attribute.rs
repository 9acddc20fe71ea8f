//! Attribute identifiers
//!
//! A tag identifier names either an intrinsic (a built-in field of every
//! span or trace) or a stored attribute, optionally scope-prefixed:
//! `.foo`, `resource.foo`, `span.foo`, `event.foo`, `link.foo`.

use crate::scope::AttributeScope;
use largo_core::{QueryError, QueryResult};
use std::fmt;

/// The fixed tag list returned for the intrinsic scope.
pub const INTRINSIC_TAGS: &[&str] = &[
    "duration",
    "kind",
    "name",
    "rootName",
    "rootServiceName",
    "status",
    "statusMessage",
    "traceDuration",
];

/// Built-in fields addressable in queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Intrinsic {
    /// Trace identifier
    TraceId,
    /// Span identifier
    SpanId,
    /// Trace id referenced by a span link
    LinkTraceId,
    /// Span id referenced by a span link
    LinkSpanId,
    /// Span duration
    Duration,
    /// Whole-trace duration
    TraceDuration,
    /// Span name
    Name,
    /// Span status
    Status,
    /// Span kind
    Kind,
    /// Service name of the root span
    RootServiceName,
    /// Name of the root span
    RootSpanName,
}

impl Intrinsic {
    /// Canonical identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intrinsic::TraceId => "trace:id",
            Intrinsic::SpanId => "span:id",
            Intrinsic::LinkTraceId => "link:traceID",
            Intrinsic::LinkSpanId => "link:spanID",
            Intrinsic::Duration => "duration",
            Intrinsic::TraceDuration => "traceDuration",
            Intrinsic::Name => "name",
            Intrinsic::Status => "status",
            Intrinsic::Kind => "kind",
            Intrinsic::RootServiceName => "rootServiceName",
            Intrinsic::RootSpanName => "rootName",
        }
    }

    /// Parse an intrinsic from its identifier string.
    pub fn parse(s: &str) -> Option<Intrinsic> {
        match s {
            "trace:id" => Some(Intrinsic::TraceId),
            "span:id" => Some(Intrinsic::SpanId),
            "link:traceID" => Some(Intrinsic::LinkTraceId),
            "link:spanID" => Some(Intrinsic::LinkSpanId),
            "duration" => Some(Intrinsic::Duration),
            "traceDuration" => Some(Intrinsic::TraceDuration),
            "name" => Some(Intrinsic::Name),
            "status" => Some(Intrinsic::Status),
            "kind" => Some(Intrinsic::Kind),
            "rootServiceName" => Some(Intrinsic::RootServiceName),
            "rootName" => Some(Intrinsic::RootSpanName),
            _ => None,
        }
    }
}

impl fmt::Display for Intrinsic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parsed tag identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// A built-in field
    Intrinsic(Intrinsic),
    /// A stored attribute, optionally scope-constrained
    Scoped {
        /// Scope constraint, `None` for unscoped
        scope: AttributeScope,
        /// Attribute name
        name: String,
    },
}

impl Attribute {
    /// Whether this identifier names one of the id-valued intrinsics.
    /// Value enumeration over ids is pointless and is rejected up front.
    pub fn is_id_intrinsic(&self) -> bool {
        matches!(
            self,
            Attribute::Intrinsic(
                Intrinsic::TraceId
                    | Intrinsic::SpanId
                    | Intrinsic::LinkTraceId
                    | Intrinsic::LinkSpanId
            )
        )
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Intrinsic(i) => write!(f, "{}", i),
            Attribute::Scoped { scope, name } => match scope {
                AttributeScope::None => write!(f, ".{}", name),
                other => write!(f, "{}.{}", other.as_str(), name),
            },
        }
    }
}

/// Characters permitted in attribute names.
fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '/'))
}

/// Parse a tag identifier.
///
/// Accepts intrinsic names, `.name` for unscoped attributes, scope-prefixed
/// names, and bare legacy names (treated as unscoped). Attribute names may
/// themselves contain dots, so an unrecognized prefix is part of the name,
/// not an error.
pub fn parse_identifier(s: &str) -> QueryResult<Attribute> {
    let s = s.trim();

    if let Some(intrinsic) = Intrinsic::parse(s) {
        return Ok(Attribute::Intrinsic(intrinsic));
    }

    if let Some(rest) = s.strip_prefix('.') {
        if !valid_name(rest) {
            return Err(QueryError::InvalidTagName(s.to_owned()));
        }
        return Ok(Attribute::Scoped {
            scope: AttributeScope::None,
            name: rest.to_owned(),
        });
    }

    for (prefix, scope) in [
        ("resource.", AttributeScope::Resource),
        ("span.", AttributeScope::Span),
        ("event.", AttributeScope::Event),
        ("link.", AttributeScope::Link),
    ] {
        if let Some(rest) = s.strip_prefix(prefix) {
            if !valid_name(rest) {
                return Err(QueryError::InvalidTagName(s.to_owned()));
            }
            return Ok(Attribute::Scoped {
                scope,
                name: rest.to_owned(),
            });
        }
    }

    // Bare legacy identifier
    if !valid_name(s) {
        return Err(QueryError::InvalidTagName(s.to_owned()));
    }
    Ok(Attribute::Scoped {
        scope: AttributeScope::None,
        name: s.to_owned(),
    })
}

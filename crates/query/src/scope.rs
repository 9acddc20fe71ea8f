//! Attribute scopes

use std::fmt;

/// Where an attribute lives on a trace
///
/// `None` means "no scope constraint" when used in a request, and
/// "unscoped attribute" when describing a tag. `Unknown` marks an
/// unrecognized scope string; requests carrying it are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeScope {
    /// No scope constraint, or an unscoped attribute
    None,
    /// Resource-level attribute
    Resource,
    /// Span-level attribute
    Span,
    /// Span event attribute
    Event,
    /// Span link attribute
    Link,
    /// Unrecognized scope string
    Unknown,
}

impl AttributeScope {
    /// Parse a scope from its request string. The empty string means no
    /// constraint. Anything unrecognized maps to `Unknown`.
    pub fn parse(s: &str) -> AttributeScope {
        match s {
            "" | "none" => AttributeScope::None,
            "resource" => AttributeScope::Resource,
            "span" => AttributeScope::Span,
            "event" => AttributeScope::Event,
            "link" => AttributeScope::Link,
            _ => AttributeScope::Unknown,
        }
    }

    /// Canonical string form, used as the scope key in responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeScope::None => "none",
            AttributeScope::Resource => "resource",
            AttributeScope::Span => "span",
            AttributeScope::Event => "event",
            AttributeScope::Link => "link",
            AttributeScope::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AttributeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_scopes() {
        assert_eq!(AttributeScope::parse(""), AttributeScope::None);
        assert_eq!(AttributeScope::parse("none"), AttributeScope::None);
        assert_eq!(AttributeScope::parse("resource"), AttributeScope::Resource);
        assert_eq!(AttributeScope::parse("span"), AttributeScope::Span);
        assert_eq!(AttributeScope::parse("event"), AttributeScope::Event);
        assert_eq!(AttributeScope::parse("link"), AttributeScope::Link);
    }

    #[test]
    fn test_parse_unknown_scope() {
        assert_eq!(AttributeScope::parse("bogus"), AttributeScope::Unknown);
        // the intrinsic sentinel is not a real scope
        assert_eq!(AttributeScope::parse("intrinsic"), AttributeScope::Unknown);
    }

    #[test]
    fn test_roundtrip() {
        for scope in [
            AttributeScope::None,
            AttributeScope::Resource,
            AttributeScope::Span,
            AttributeScope::Event,
            AttributeScope::Link,
        ] {
            assert_eq!(AttributeScope::parse(scope.as_str()), scope);
        }
    }
}

//! Matcher extraction from structured query expressions
//!
//! The dispatch layer only needs the conjunctive `attribute op literal`
//! core of an expression: an empty matcher list selects the fast native
//! path, a non-empty list is handed to the evaluator. Extraction is
//! deliberately lossy in the safe direction: any construct outside the
//! supported subset weakens the filter toward match-all, never the other
//! way around.

use crate::attribute::{parse_identifier, Attribute};
use std::fmt;

/// Comparison operator in a matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOp {
    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `=~`
    Regex,
    /// `!~`
    NotRegex,
}

impl MatchOp {
    /// Operator spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchOp::Eq => "=",
            MatchOp::NotEq => "!=",
            MatchOp::Gt => ">",
            MatchOp::Gte => ">=",
            MatchOp::Lt => "<",
            MatchOp::Lte => "<=",
            MatchOp::Regex => "=~",
            MatchOp::NotRegex => "!~",
        }
    }
}

impl fmt::Display for MatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A literal operand in a matcher
#[derive(Debug, Clone, PartialEq)]
pub enum StaticValue {
    /// String literal
    String(String),
    /// Integer literal
    Int(i64),
    /// Float literal
    Float(f64),
    /// Boolean literal
    Bool(bool),
}

impl fmt::Display for StaticValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaticValue::String(s) => write!(f, "\"{}\"", s),
            StaticValue::Int(i) => write!(f, "{}", i),
            StaticValue::Float(v) => write!(f, "{}", v),
            StaticValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// One `attribute op literal` condition
#[derive(Debug, Clone, PartialEq)]
pub struct Matcher {
    /// Left-hand side identifier
    pub attribute: Attribute,
    /// Comparison operator
    pub op: MatchOp,
    /// Right-hand side literal
    pub value: StaticValue,
}

/// Whether a raw request query is a structured expression (and should take
/// the evaluator path for trace search) rather than a free-form one.
pub fn is_structured_query(query: &str) -> bool {
    query.trim_start().starts_with('{')
}

/// Extract the simple conjunctive matchers from a structured expression.
///
/// Returns an empty list (match all) for empty or non-structured input,
/// and for any expression using disjunction. Individual conjuncts that are
/// not plain `attribute op literal` comparisons are dropped.
pub fn extract_matchers(query: &str) -> Vec<Matcher> {
    let q = query.trim();
    if q.len() < 2 || !q.starts_with('{') || !q.ends_with('}') {
        return Vec::new();
    }
    let body = &q[1..q.len() - 1];

    let conjuncts = match split_conjuncts(body) {
        Some(parts) => parts,
        None => return Vec::new(),
    };

    conjuncts.iter().filter_map(|c| parse_matcher(c)).collect()
}

/// Split on top-level `&&`, respecting string literals. Returns None when
/// the expression contains `||`, which the matcher model cannot express.
fn split_conjuncts(body: &str) -> Option<Vec<&str>> {
    let bytes = body.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_string = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                // skip escaped quotes inside strings
                if !(in_string && i > 0 && bytes[i - 1] == b'\\') {
                    in_string = !in_string;
                }
            }
            b'&' if !in_string && i + 1 < bytes.len() && bytes[i + 1] == b'&' => {
                parts.push(&body[start..i]);
                start = i + 2;
                i += 1;
            }
            b'|' if !in_string && i + 1 < bytes.len() && bytes[i + 1] == b'|' => {
                return None;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&body[start..]);
    Some(parts)
}

/// Parse one `attribute op literal` conjunct. Returns None for anything
/// outside the subset.
fn parse_matcher(conjunct: &str) -> Option<Matcher> {
    let c = conjunct.trim();
    if c.is_empty() {
        return None;
    }

    let (lhs, op, rhs) = split_operator(c)?;
    let attribute = parse_identifier(lhs.trim()).ok()?;
    let value = parse_literal(rhs.trim())?;
    Some(Matcher {
        attribute,
        op,
        value,
    })
}

/// Find the first top-level comparison operator outside string literals.
/// Two-character operators are matched before their one-character
/// prefixes.
fn split_operator(c: &str) -> Option<(&str, MatchOp, &str)> {
    const OPS: &[(&str, MatchOp)] = &[
        (">=", MatchOp::Gte),
        ("<=", MatchOp::Lte),
        ("!=", MatchOp::NotEq),
        ("=~", MatchOp::Regex),
        ("!~", MatchOp::NotRegex),
        (">", MatchOp::Gt),
        ("<", MatchOp::Lt),
        ("=", MatchOp::Eq),
    ];

    let bytes = c.as_bytes();
    let mut in_string = false;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'"' && !(in_string && i > 0 && bytes[i - 1] == b'\\') {
            in_string = !in_string;
            i += 1;
            continue;
        }
        if !in_string {
            for (spelling, op) in OPS {
                if c[i..].starts_with(spelling) {
                    return Some((&c[..i], *op, &c[i + spelling.len()..]));
                }
            }
        }
        i += 1;
    }
    None
}

/// Parse a literal operand: quoted string, boolean, integer, or float.
fn parse_literal(s: &str) -> Option<StaticValue> {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        let body = &s[1..s.len() - 1];
        return Some(StaticValue::String(body.replace("\\\"", "\"")));
    }
    match s {
        "true" => return Some(StaticValue::Bool(true)),
        "false" => return Some(StaticValue::Bool(false)),
        _ => {}
    }
    if let Ok(i) = s.parse::<i64>() {
        return Some(StaticValue::Int(i));
    }
    if let Ok(f) = s.parse::<f64>() {
        return Some(StaticValue::Float(f));
    }
    None
}

//! Identifier newtypes
//!
//! - BlockId: unique identifier for a storage block
//! - TraceId: 128-bit trace identifier with hex formatting

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a storage block
///
/// A BlockId is a wrapper around a UUID v4. Blocks keep their id across
/// the head, completing, and complete stages of their lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(Uuid);

impl BlockId {
    /// Create a new random BlockId using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a BlockId from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Parse a BlockId from a string representation
    ///
    /// Accepts standard UUID format. Returns None if the string is not a
    /// valid UUID.
    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    /// Get the raw bytes of this BlockId
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 128-bit trace identifier
///
/// Trace ids are opaque 16-byte values. The textual form is lowercase hex
/// without separators; shorter hex strings parse left-padded with zeros,
/// which is how callers commonly write 64-bit ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TraceId([u8; 16]);

impl TraceId {
    /// Create a TraceId from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Parse a TraceId from a hex string
    ///
    /// Accepts up to 32 hex characters of even length; shorter inputs are
    /// left-padded with zeros. Returns None on invalid input.
    pub fn from_hex(s: &str) -> Option<Self> {
        if s.is_empty() || s.len() > 32 || s.len() % 2 != 0 {
            return None;
        }
        let mut bytes = [0u8; 16];
        let offset = 16 - s.len() / 2;
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let hi = (chunk[0] as char).to_digit(16)?;
            let lo = (chunk[1] as char).to_digit(16)?;
            bytes[offset + i] = (hi * 16 + lo) as u8;
        }
        Some(Self(bytes))
    }

    /// Get the raw bytes of this TraceId
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

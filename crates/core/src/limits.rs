//! Per-tenant query limits
//!
//! The dispatch layer consumes limits through the [`TenantLimits`] trait so
//! deployments can plug in runtime-reloadable overrides. A zero limit
//! always means unbounded.

/// Per-tenant limits consumed by the tag enumeration surfaces
pub trait TenantLimits: Send + Sync {
    /// Byte budget for distinct tag names or values collected by a single
    /// query. 0 means unbounded.
    fn max_bytes_per_tag_values_query(&self, tenant: &str) -> usize;

    /// Maximum number of blocks a single tag value query may inspect.
    /// 0 means unbounded.
    fn max_blocks_per_tag_values_query(&self, tenant: &str) -> usize;
}

/// Fixed limits applied identically to every tenant
#[derive(Debug, Clone)]
pub struct StaticLimits {
    /// Byte budget for distinct collection, 0 for unbounded
    pub max_bytes_per_tag_values_query: usize,
    /// Block cap for tag value queries, 0 for unbounded
    pub max_blocks_per_tag_values_query: usize,
}

impl Default for StaticLimits {
    fn default() -> Self {
        StaticLimits {
            max_bytes_per_tag_values_query: 5_000_000,
            max_blocks_per_tag_values_query: 0,
        }
    }
}

impl StaticLimits {
    /// Limits with every bound disabled
    pub fn unbounded() -> Self {
        StaticLimits {
            max_bytes_per_tag_values_query: 0,
            max_blocks_per_tag_values_query: 0,
        }
    }
}

impl TenantLimits for StaticLimits {
    fn max_bytes_per_tag_values_query(&self, _tenant: &str) -> usize {
        self.max_bytes_per_tag_values_query
    }

    fn max_blocks_per_tag_values_query(&self, _tenant: &str) -> usize {
        self.max_blocks_per_tag_values_query
    }
}

//! One tenant's search instance

use crate::registry::BlockRegistry;
use largo_core::TenantLimits;
use std::sync::Arc;

/// Per-tenant search entry point
///
/// Holds the tenant's block registry and the limits provider. The four
/// query surfaces live in the dispatch modules as `impl` blocks on this
/// type; ingest reaches the registry through [`TenantInstance::registry`].
pub struct TenantInstance {
    registry: BlockRegistry,
    limits: Arc<dyn TenantLimits>,
}

impl TenantInstance {
    /// Create an instance with an empty registry.
    pub fn new(limits: Arc<dyn TenantLimits>) -> Self {
        TenantInstance {
            registry: BlockRegistry::new(),
            limits,
        }
    }

    /// The block registry backing this instance.
    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub(crate) fn limits(&self) -> &dyn TenantLimits {
        self.limits.as_ref()
    }
}

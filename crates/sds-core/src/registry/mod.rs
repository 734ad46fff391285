//! Plugin-based resource registry
//!
//! The registry maps resource type names to their lifecycle implementation,
//! so the orchestrator can dispatch on the type stored in state without a
//! hardcoded match over every object kind.
//!
//! ## Registration
//!
//! Resource crates register their types during initialization:
//!
//! ```rust,ignore
//! // In sds-resources
//! pub fn register(registry: &ResourceRegistry, transport: Arc<dyn Transport>) {
//!     registry.register_resource(Arc::new(DnsForwardZone::resource(transport.clone())));
//!     // ...
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};
use crate::traits::Resource;

/// Registry of resource types keyed by type name
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ResourceRegistry {
    resources: RwLock<BTreeMap<&'static str, Arc<dyn Resource>>>,
}

impl ResourceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource type under its [`Resource::type_name`]
    ///
    /// Registering the same name twice replaces the earlier entry.
    pub fn register_resource(&self, resource: Arc<dyn Resource>) {
        let name = resource.type_name();
        let mut resources = self
            .resources
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if resources.insert(name, resource).is_some() {
            tracing::warn!("Resource type registered twice: {}", name);
        }
    }

    /// Look up a resource type
    ///
    /// # Returns
    ///
    /// - `Ok(Arc<dyn Resource>)`: The registered implementation
    /// - `Err(Error::Registry)`: If the type is not registered
    pub fn resource(&self, name: &str) -> Result<Arc<dyn Resource>> {
        let resources = self
            .resources
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        resources
            .get(name)
            .cloned()
            .ok_or_else(|| Error::registry(format!("Unknown resource type: {}", name)))
    }

    /// List all registered type names, sorted
    pub fn list_resources(&self) -> Vec<&'static str> {
        let resources = self
            .resources
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        resources.keys().copied().collect()
    }

    /// Check if a resource type is registered
    pub fn has_resource(&self, name: &str) -> bool {
        let resources = self
            .resources
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        resources.contains_key(name)
    }
}

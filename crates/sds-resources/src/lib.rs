// # SOLIDserver resource types
//
// This crate provides the managed object types:
//
// - `solidserver_dns_forward_zone`: DNS forward zones
// - `solidserver_app_pool`: application pools (SOLIDserver ≥ 7.1.0)
// - `solidserver_ip_mac`: IP ↔ MAC mappings
//
// Zones and pools are plain REST objects handled by the generic adapter in
// `sds-core`; this crate only maps their fields. IP ↔ MAC mappings edit an
// existing IP address record and implement the lifecycle directly.

pub mod application_pool;
pub mod dns_forward_zone;
pub mod ip_mac;

use std::sync::Arc;

use sds_core::{ResourceRegistry, Transport};

pub use application_pool::ApplicationPool;
pub use dns_forward_zone::DnsForwardZone;
pub use ip_mac::IpMac;

/// Register every resource type, bound to `transport`
///
/// # Example
///
/// ```rust,ignore
/// let registry = ResourceRegistry::new();
/// sds_resources::register(&registry, Arc::new(client));
/// ```
pub fn register(registry: &ResourceRegistry, transport: Arc<dyn Transport>) {
    registry.register_resource(Arc::new(DnsForwardZone::resource(transport.clone())));
    registry.register_resource(Arc::new(ApplicationPool::resource(transport.clone())));
    registry.register_resource(Arc::new(IpMac::new(transport)));

    tracing::debug!("Registered resource types: {:?}", registry.list_resources());
}

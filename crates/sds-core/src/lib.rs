// # sds-core
//
// Core library for managing SOLIDserver objects through its REST gateway.
//
// ## Architecture Overview
//
// - **Transport**: Trait for issuing REST calls (implemented by `sds-client`)
// - **RestResource**: Generic CRUD adapter over one REST object family
// - **Resource**: Lifecycle contract of a managed object type
// - **StateStore**: Trait for persistent local state
// - **Engine**: Orchestrator deciding create / update / replace / delete
// - **ResourceRegistry**: Plugin-based registry of resource types
//
// ## Design Principles
//
// 1. **Separation of Concerns**: REST plumbing is shared, per-type code only
//    maps fields to parameters and back
// 2. **Plugin-Based**: Resource types are registered, no hard-coded dispatch
// 3. **Library-First**: The CLI is a thin layer over this crate
// 4. **Stale over wrong**: A failed read never rewrites local state

pub mod adapter;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod http;
pub mod params;
pub mod registry;
pub mod response;
pub mod schema;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use adapter::{ObjectMapping, ReadMode, RestObject, RestResource};
pub use config::{AuthMode, ProviderConfig};
pub use data::ResourceData;
pub use engine::{ApplyOutcome, Engine, RefreshOutcome};
pub use error::{Error, Result};
pub use http::{Method, RawResponse};
pub use params::Parameters;
pub use registry::ResourceRegistry;
pub use schema::{FieldSchema, Schema, Validator};
pub use state::{FileStateStore, MemoryStateStore};
pub use traits::{Resource, StateRecord, StateStore, Transport};

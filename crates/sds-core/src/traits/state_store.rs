// # State Store Trait
//
// Defines the interface for persistent local state.
//
// ## Purpose
//
// The orchestrator owns local state: the id and mirrored fields of every
// managed resource, keyed by a user-chosen address (e.g. "zones.internal").
// The store only persists what it is given; it never talks to the
// appliance.
//
// ## Implementations
//
// - `MemoryStateStore`: tests and one-shot runs
// - `FileStateStore`: JSON file with atomic writes and backup recovery

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::ResourceData;

/// Stored state of one managed resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    /// Resource type name
    pub resource_type: String,
    /// Id and mirrored fields
    pub data: ResourceData,
    /// When the record was last written from an appliance answer
    pub last_refreshed: DateTime<Utc>,
}

impl StateRecord {
    /// Create a record stamped with the current time
    pub fn new(resource_type: impl Into<String>, data: ResourceData) -> Self {
        Self {
            resource_type: resource_type.into(),
            data,
            last_refreshed: Utc::now(),
        }
    }
}

/// Trait for state store implementations
///
/// All methods must be safe to call concurrently from multiple tasks.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the record stored at `address`
    async fn get(&self, address: &str) -> Result<Option<StateRecord>, crate::Error>;

    /// Create or replace the record at `address`
    async fn put(&self, address: &str, record: &StateRecord) -> Result<(), crate::Error>;

    /// Remove the record at `address` (no error if absent)
    async fn delete(&self, address: &str) -> Result<(), crate::Error>;

    /// List all addresses, sorted
    async fn list(&self) -> Result<Vec<String>, crate::Error>;

    /// Persist any pending changes
    async fn flush(&self) -> Result<(), crate::Error>;
}

//! Resource lifecycle engine
//!
//! The Engine plays the orchestrator role: it decides which lifecycle
//! operation a desired configuration needs, drives the registered
//! [`Resource`](crate::traits::Resource) and persists what the appliance
//! answered.
//!
//! ## Architecture
//!
//! ```text
//!  desired config ──┐
//!                   ▼
//!            ┌──────────────┐        ┌────────────────────┐
//!            │    Engine    │───────▶│ ResourceRegistry   │
//!            └──────────────┘        │ (type → Resource)  │
//!               │        ▲           └────────────────────┘
//!               ▼        │                     │
//!        ┌─────────────┐ │                     ▼
//!        │ StateStore  │─┘             ┌──────────────┐
//!        │ (address →  │               │  Transport   │
//!        │  record)    │               └──────────────┘
//!        └─────────────┘
//! ```
//!
//! ## Apply Flow
//!
//! 1. Build `ResourceData` from the config via the type's schema
//! 2. No stored record: Create
//! 3. Stored record of another type, or a force-new field changed:
//!    Delete then Create
//! 4. Otherwise Update, or nothing when the type has no Update
//! 5. Persist the resulting record
//!
//! Failed operations leave the stored record as it was.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::data::ResourceData;
use crate::error::{Error, Result};
use crate::registry::ResourceRegistry;
use crate::traits::{Resource, StateRecord, StateStore};

/// What `apply` did to reach the desired configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// No prior state; the object was created
    Created { id: String },

    /// The existing object was updated in place
    Updated { id: String },

    /// The existing object was deleted and created again
    Replaced {
        previous_id: String,
        id: String,
        /// Fields that forced the replacement
        changed: Vec<String>,
    },

    /// Nothing to do
    Unchanged { id: String },
}

impl ApplyOutcome {
    /// Oid of the object after the apply
    pub fn id(&self) -> &str {
        match self {
            ApplyOutcome::Created { id }
            | ApplyOutcome::Updated { id }
            | ApplyOutcome::Replaced { id, .. }
            | ApplyOutcome::Unchanged { id } => id,
        }
    }
}

/// What `refresh` found
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The object exists; the stored record was updated
    Refreshed(StateRecord),

    /// The object is gone; its record was dropped
    Gone,
}

/// Lifecycle engine over a registry and a state store
///
/// ## Threading
///
/// The engine holds only shared handles and can be used from several tasks.
/// Operations on the same address are not serialized against each other.
pub struct Engine {
    /// Resource types by name
    registry: Arc<ResourceRegistry>,

    /// Local state keyed by address
    state_store: Box<dyn StateStore>,
}

impl Engine {
    /// Create a new engine
    ///
    /// # Parameters
    ///
    /// - `registry`: Registered resource types
    /// - `state_store`: State store implementation
    pub fn new(registry: Arc<ResourceRegistry>, state_store: Box<dyn StateStore>) -> Self {
        Self {
            registry,
            state_store,
        }
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Stored record at `address`
    pub async fn state(&self, address: &str) -> Result<Option<StateRecord>> {
        self.state_store.get(address).await
    }

    /// All stored addresses, sorted
    pub async fn addresses(&self) -> Result<Vec<String>> {
        self.state_store.list().await
    }

    /// Bring the object at `address` to the configuration `config`
    ///
    /// # Parameters
    ///
    /// - `address`: Local name of the managed object
    /// - `resource_type`: Registered type name
    /// - `config`: JSON object of user-facing fields
    ///
    /// # Returns
    ///
    /// - `Ok(ApplyOutcome)`: What was done; the new record is persisted
    /// - `Err(Error)`: Validation, lookup or appliance failure
    pub async fn apply(
        &self,
        address: &str,
        resource_type: &str,
        config: &Value,
    ) -> Result<ApplyOutcome> {
        let resource = self.registry.resource(resource_type)?;
        let mut desired = resource.schema().build(config)?;

        let Some(current) = self.live_record(address).await? else {
            debug!("No state for {}, creating {}", address, resource_type);
            resource.create(&mut desired).await?;
            let id = desired.id().to_string();
            self.persist(address, resource.as_ref(), desired).await?;
            info!("Created {} ({}) with oid {}", address, resource_type, id);
            return Ok(ApplyOutcome::Created { id });
        };

        let changed: Vec<String> = if current.resource_type != resource_type {
            vec!["type".to_string()]
        } else {
            resource
                .schema()
                .requires_replace(&current.data, &desired)
                .into_iter()
                .map(str::to_string)
                .collect()
        };

        if !changed.is_empty() {
            return self
                .replace(address, current, resource.as_ref(), desired, changed)
                .await;
        }

        desired.set_id(current.data.id());

        if !resource.supports_update() {
            debug!("{} has no in-place update, nothing to do", resource_type);
            return Ok(ApplyOutcome::Unchanged {
                id: current.data.id().to_string(),
            });
        }

        if resource.schema().same_fields(&current.data, &desired) {
            debug!("{} already matches its configuration", address);
            return Ok(ApplyOutcome::Unchanged {
                id: current.data.id().to_string(),
            });
        }

        resource.update(&mut desired).await?;
        let id = desired.id().to_string();
        self.persist(address, resource.as_ref(), desired).await?;
        info!("Updated {} ({}) oid {}", address, resource_type, id);
        Ok(ApplyOutcome::Updated { id })
    }

    /// Delete then create; the old object is removed from the appliance
    /// before the new one exists
    async fn replace(
        &self,
        address: &str,
        current: StateRecord,
        resource: &dyn Resource,
        mut desired: ResourceData,
        changed: Vec<String>,
    ) -> Result<ApplyOutcome> {
        let previous_id = current.data.id().to_string();
        info!(
            "Replacing {} (oid {}): changed {}",
            address,
            previous_id,
            changed.join(", ")
        );

        // The stored type may differ from the desired one
        let old_resource = self.registry.resource(&current.resource_type)?;
        let mut old = current.data;
        old_resource.delete(&mut old).await?;
        self.state_store.delete(address).await?;

        resource.create(&mut desired).await?;
        let id = desired.id().to_string();
        self.persist(address, resource, desired).await?;

        Ok(ApplyOutcome::Replaced {
            previous_id,
            id,
            changed,
        })
    }

    /// Read the object at `address` back from the appliance
    ///
    /// On failure the stored record is kept unchanged and the error is
    /// returned. A read that clears the id means the object is gone; the
    /// record is dropped.
    pub async fn refresh(&self, address: &str) -> Result<RefreshOutcome> {
        let record = self.require(address).await?;
        let resource = self.registry.resource(&record.resource_type)?;

        let mut data = record.data;
        if let Err(e) = resource.read(&mut data).await {
            warn!("Refresh of {} failed, keeping stale state: {}", address, e);
            return Err(e);
        }

        if !data.has_id() {
            info!("{} no longer exists, dropping its state", address);
            self.state_store.delete(address).await?;
            return Ok(RefreshOutcome::Gone);
        }

        let refreshed = StateRecord::new(record.resource_type, data);
        self.state_store.put(address, &refreshed).await?;
        debug!("Refreshed {}", address);
        Ok(RefreshOutcome::Refreshed(refreshed))
    }

    /// Delete the object at `address` and drop its record
    pub async fn destroy(&self, address: &str) -> Result<()> {
        let record = self.require(address).await?;
        let resource = self.registry.resource(&record.resource_type)?;

        let mut data = record.data;
        resource.delete(&mut data).await?;
        self.state_store.delete(address).await?;
        info!("Destroyed {} ({})", address, record.resource_type);
        Ok(())
    }

    /// Adopt the existing object `id` of `resource_type` under `address`
    pub async fn import(&self, address: &str, resource_type: &str, id: &str) -> Result<StateRecord> {
        if self.state_store.get(address).await?.is_some() {
            return Err(Error::invalid_input(format!(
                "address {} is already managed",
                address
            )));
        }

        let resource = self.registry.resource(resource_type)?;
        let data = resource.import(id).await?;

        let record = StateRecord::new(resource_type, data);
        self.state_store.put(address, &record).await?;
        info!("Imported {} ({}) oid {}", address, resource_type, id);
        Ok(record)
    }

    /// Persist pending state changes
    pub async fn flush(&self) -> Result<()> {
        self.state_store.flush().await
    }

    /// Stored record with a live id, if any
    async fn live_record(&self, address: &str) -> Result<Option<StateRecord>> {
        Ok(self
            .state_store
            .get(address)
            .await?
            .filter(|record| record.data.has_id()))
    }

    async fn require(&self, address: &str) -> Result<StateRecord> {
        self.live_record(address)
            .await?
            .ok_or_else(|| Error::invalid_input(format!("no state for address {}", address)))
    }

    async fn persist(
        &self,
        address: &str,
        resource: &dyn Resource,
        data: ResourceData,
    ) -> Result<()> {
        let record = StateRecord::new(resource.type_name(), data);
        self.state_store.put(address, &record).await
    }
}

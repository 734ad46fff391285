// # Resource Trait
//
// The lifecycle contract of one managed object type, as driven by the
// orchestrator (Terraform core, or the `Engine` in this crate).
//
// ## Conventions
//
// - `create` sets the id on success
// - `read` refreshes fields; on failure it returns an error and leaves the
//   existing id and fields untouched
// - `delete` clears the id on success
// - `import` is `read` for an object with no prior state; any failure is a
//   hard error

use async_trait::async_trait;

use crate::data::ResourceData;
use crate::error::Result;
use crate::schema::Schema;

/// A managed object type with a CRUD lifecycle
#[async_trait]
pub trait Resource: Send + Sync {
    /// Type name (e.g. "solidserver_dns_forward_zone")
    fn type_name(&self) -> &'static str;

    /// User-facing fields of this type
    fn schema(&self) -> &Schema;

    /// Create the remote object described by `data` and record its id
    async fn create(&self, data: &mut ResourceData) -> Result<()>;

    /// Refresh `data` from the remote object identified by its id
    async fn read(&self, data: &mut ResourceData) -> Result<()>;

    /// Push `data` to the existing remote object
    async fn update(&self, data: &mut ResourceData) -> Result<()>;

    /// Delete the remote object and clear the id
    async fn delete(&self, data: &mut ResourceData) -> Result<()>;

    /// Adopt an existing remote object by oid
    async fn import(&self, id: &str) -> Result<ResourceData>;

    /// Whether `update` is implemented; without it every change replaces
    fn supports_update(&self) -> bool {
        true
    }
}

//! Generic REST CRUD adapter
//!
//! Almost every SOLIDserver object is managed the same way: build form
//! parameters from local state, issue one request against a fixed path,
//! read a JSON array back and pick `ret_oid` or `errmsg` out of its first
//! element. [`RestResource`] implements that lifecycle once; a resource type
//! only supplies a [`RestObject`] descriptor and an [`ObjectMapping`].
//!
//! ## Flow
//!
//! ```text
//! ResourceData ── ObjectMapping ──► Parameters ──► Transport ──► RawResponse
//!       ▲                                                           │
//!       └──────────── ObjectMapping::apply ◄── response::interpret_*┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::data::ResourceData;
use crate::error::{Error, Result};
use crate::http::Method;
use crate::params::Parameters;
use crate::response::{self, ReadOutcome, RemoteObject, WriteOutcome};
use crate::schema::Schema;
use crate::traits::{Resource, Transport};

/// Fixed REST surface of one appliance object type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestObject {
    /// Human label used in messages (e.g. "DNS forward zone")
    pub label: &'static str,
    /// Parameter carrying the oid (e.g. "dnszone_id")
    pub id_param: &'static str,
    /// Create/update endpoint (e.g. "rest/dns_zone_add")
    pub add_path: &'static str,
    /// Lookup endpoint (e.g. "rest/dns_zone_info")
    pub info_path: &'static str,
    /// Deletion endpoint (e.g. "rest/dns_zone_delete")
    pub delete_path: &'static str,
    pub create_method: Method,
    pub update_method: Method,
    pub delete_method: Method,
    /// Lowest appliance version supporting the object (e.g. 710)
    pub min_version: Option<u32>,
}

impl RestObject {
    /// Descriptor using the usual verbs: POST to create, PUT to edit,
    /// DELETE to delete
    pub const fn new(
        label: &'static str,
        id_param: &'static str,
        add_path: &'static str,
        info_path: &'static str,
        delete_path: &'static str,
    ) -> Self {
        Self {
            label,
            id_param,
            add_path,
            info_path,
            delete_path,
            create_method: Method::Post,
            update_method: Method::Put,
            delete_method: Method::Delete,
            min_version: None,
        }
    }

    /// Require at least `version` on the appliance
    pub const fn min_version(mut self, version: u32) -> Self {
        self.min_version = Some(version);
        self
    }
}

/// Why a remote object is being applied to local state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Refresh of a resource already in state
    Refresh,
    /// Adoption of an object with no prior state
    Import,
}

/// Per-type translation between local state and appliance attributes
pub trait ObjectMapping: Send + Sync {
    /// Type name (e.g. "solidserver_dns_forward_zone")
    fn type_name(&self) -> &'static str;

    /// REST surface of the object
    fn object(&self) -> &RestObject;

    /// User-facing fields
    fn schema(&self) -> &Schema;

    /// Parameters for a creation, after `add_flag=new_only`
    fn create_params(&self, data: &ResourceData, params: &mut Parameters);

    /// Parameters for an edit, after `<id_param>` and `add_flag=edit_only`
    fn update_params(&self, data: &ResourceData, params: &mut Parameters);

    /// Copy the tracked attributes of `remote` into `data`
    fn apply(&self, remote: &RemoteObject, data: &mut ResourceData, mode: ReadMode);
}

/// [`Resource`] implementation shared by all form-encoded REST objects
pub struct RestResource<M> {
    transport: Arc<dyn Transport>,
    mapping: M,
}

impl<M: ObjectMapping> RestResource<M> {
    pub fn new(transport: Arc<dyn Transport>, mapping: M) -> Self {
        Self { transport, mapping }
    }

    fn object(&self) -> &RestObject {
        self.mapping.object()
    }

    fn check_version(&self) -> Result<()> {
        let object = self.object();
        match object.min_version {
            Some(required) if self.transport.version() < required => Err(Error::Unsupported {
                object: object.label,
                required,
                actual: self.transport.version(),
            }),
            _ => Ok(()),
        }
    }

    fn id_params(&self, id: &str) -> Parameters {
        let mut params = Parameters::new();
        params.add(self.object().id_param, id);
        params
    }

    /// Send a create or edit and record the returned oid
    async fn write(
        &self,
        action: &'static str,
        method: Method,
        params: Parameters,
        data: &mut ResourceData,
    ) -> Result<()> {
        let object = self.object();
        let response = self
            .transport
            .request(method, object.add_path, &params)
            .await?;

        match response::interpret_write(&response) {
            WriteOutcome::Accepted(oid) => {
                debug!("{} {} (oid): {}", past_tense(action), object.label, oid);
                data.set_id(oid);
                Ok(())
            }
            WriteOutcome::Rejected(message) => Err(Error::application(
                action,
                object.label,
                data.display_name(),
                message,
            )),
        }
    }

    /// Look the object up by oid
    async fn fetch(&self, id: &str) -> Result<ReadOutcome> {
        let response = self
            .transport
            .request(Method::Get, self.object().info_path, &self.id_params(id))
            .await?;
        Ok(response::interpret_read(&response))
    }
}

fn past_tense(action: &str) -> &'static str {
    match action {
        "create" => "Created",
        "update" => "Updated",
        "delete" => "Deleted",
        _ => "Processed",
    }
}

#[async_trait]
impl<M: ObjectMapping + 'static> Resource for RestResource<M> {
    fn type_name(&self) -> &'static str {
        self.mapping.type_name()
    }

    fn schema(&self) -> &Schema {
        self.mapping.schema()
    }

    async fn create(&self, data: &mut ResourceData) -> Result<()> {
        self.check_version()?;

        let mut params = Parameters::new();
        params.add("add_flag", "new_only");
        self.mapping.create_params(data, &mut params);

        let method = self.object().create_method;
        self.write("create", method, params, data).await
    }

    async fn read(&self, data: &mut ResourceData) -> Result<()> {
        self.check_version()?;

        let object = self.object();
        if !data.has_id() {
            return Err(Error::not_found(object.label, data.display_name()));
        }

        match self.fetch(data.id()).await? {
            ReadOutcome::Found(remote) => {
                self.mapping.apply(&remote, data, ReadMode::Refresh);
                Ok(())
            }
            ReadOutcome::Missing(message) => {
                match message {
                    Some(msg) => debug!(
                        "Unable to find {}: {} ({})",
                        object.label,
                        data.display_name(),
                        msg
                    ),
                    None => debug!("Unable to find {} (oid): {}", object.label, data.id()),
                }
                // The id stays: an outage must not look like a deletion
                Err(Error::not_found(object.label, data.display_name()))
            }
        }
    }

    async fn update(&self, data: &mut ResourceData) -> Result<()> {
        self.check_version()?;

        let mut params = self.id_params(data.id());
        params.add("add_flag", "edit_only");
        self.mapping.update_params(data, &mut params);

        let method = self.object().update_method;
        self.write("update", method, params, data).await
    }

    async fn delete(&self, data: &mut ResourceData) -> Result<()> {
        self.check_version()?;

        let object = self.object();
        let response = self
            .transport
            .request(object.delete_method, object.delete_path, &self.id_params(data.id()))
            .await?;

        match response::interpret_delete(&response) {
            Ok(()) => {
                debug!("Deleted {} (oid): {}", object.label, data.id());
                data.clear_id();
                Ok(())
            }
            Err(message) => Err(Error::application(
                "delete",
                object.label,
                data.display_name(),
                message,
            )),
        }
    }

    async fn import(&self, id: &str) -> Result<ResourceData> {
        self.check_version()?;

        let object = self.object();
        match self.fetch(id).await? {
            ReadOutcome::Found(remote) => {
                let mut data = ResourceData::with_id(id);
                self.mapping.apply(&remote, &mut data, ReadMode::Import);
                Ok(data)
            }
            ReadOutcome::Missing(message) => {
                match message {
                    Some(msg) => debug!("Unable to import {} (oid): {} ({})", object.label, id, msg),
                    None => debug!("Unable to find and import {} (oid): {}", object.label, id),
                }
                Err(Error::import(object.label, id))
            }
        }
    }
}

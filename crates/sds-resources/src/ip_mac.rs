//! IP ↔ MAC mappings
//!
//! Maps an existing IP address to a MAC address. There is no object of its
//! own on the appliance: creating the mapping edits the IP address record,
//! deleting it edits the same record with an empty MAC. Useful when
//! provisioning addresses for machines whose MAC is only known once deployed.
//!
//! Every field forces a replacement, so there is no update and no import.

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use sds_core::error::{Error, Result};
use sds_core::http::Method;
use sds_core::params::Parameters;
use sds_core::response::{self, ReadOutcome, WriteOutcome, field_str};
use sds_core::schema::{FieldSchema, Schema, Validator};
use sds_core::{Resource, ResourceData, Transport};

pub const TYPE_NAME: &str = "solidserver_ip_mac";

const LABEL: &str = "IP MAC association";

const ADD_PATH: &str = "rest/ip_add";
const INFO_PATH: &str = "rest/ip_address_info";

/// The address lookup also answers 201
const READ_STATUSES: &[u16] = &[200, 201];

lazy_static::lazy_static! {
    static ref MAC_ADDRESS: Regex =
        Regex::new("^([0-9A-Fa-f]{2}[:-]){5}([0-9A-Fa-f]{2})$").expect("valid MAC address regex");
}

/// IP ↔ MAC mapping lifecycle
pub struct IpMac {
    transport: Arc<dyn Transport>,
    schema: Schema,
}

impl IpMac {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            schema: Schema::new(vec![
                FieldSchema::string("space")
                    .required()
                    .force_new()
                    .describe("The name of the space into which mapping the IP and the MAC address."),
                FieldSchema::string("address")
                    .required()
                    .force_new()
                    .validate(Validator::IpAddress)
                    .describe("The IP address to map with the MAC address."),
                FieldSchema::string("mac")
                    .required()
                    .force_new()
                    .ignore_case()
                    .validate(Validator::Matches {
                        pattern: MAC_ADDRESS.clone(),
                        message: "Unsupported MAC address format.",
                    })
                    .describe("The MAC address to map with the IP address."),
            ]),
        }
    }

    /// Edit the IP address record, setting `mac` as its MAC address
    fn edit_params(data: &ResourceData, mac: &str) -> Parameters {
        let mut params = Parameters::new();
        params
            .add("site_name", data.get_str("space"))
            .add("add_flag", "edit_only")
            .add("hostaddr", data.get_str("address"))
            .add("mac_addr", mac)
            .add("keep_class_parameters", "1");
        params
    }

    /// Label used in error messages
    fn mapping_name(data: &ResourceData) -> String {
        format!("{} and {}", data.get_str("address"), data.get_str("mac"))
    }

    async fn edit(&self, action: &'static str, data: &ResourceData, mac: &str) -> Result<String> {
        let response = self
            .transport
            .request(Method::Put, ADD_PATH, &Self::edit_params(data, mac))
            .await?;

        match response::interpret_write(&response) {
            WriteOutcome::Accepted(oid) => Ok(oid),
            WriteOutcome::Rejected(message) => Err(Error::application(
                action,
                LABEL,
                Self::mapping_name(data),
                message,
            )),
        }
    }
}

#[async_trait]
impl Resource for IpMac {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, data: &mut ResourceData) -> Result<()> {
        let mac = data.get_str("mac").to_lowercase();
        let oid = self.edit("create", data, &mac).await?;

        tracing::debug!("Created {} (oid): {}", LABEL, oid);
        data.set_id(oid);
        Ok(())
    }

    /// Succeeds while the address still carries the mapped MAC; a different
    /// MAC means the mapping is gone and the id is cleared
    async fn read(&self, data: &mut ResourceData) -> Result<()> {
        tracing::debug!(
            "Reading information about IP address (oid): {}; associated to the mac: {}",
            data.id(),
            data.get_str("mac")
        );

        let mut params = Parameters::new();
        params.add("ip_id", data.id());
        let response = self.transport.request(Method::Get, INFO_PATH, &params).await?;

        match response::interpret_read_with(&response, READ_STATUSES) {
            ReadOutcome::Found(remote) => {
                if field_str(&remote, "mac_addr").eq_ignore_ascii_case(data.get_str("mac")) {
                    return Ok(());
                }
                tracing::debug!(
                    "Unable to find the IP address (oid): {}; associated to the mac ({})",
                    data.id(),
                    data.get_str("mac")
                );
                data.clear_id();
                Ok(())
            }
            ReadOutcome::Missing(message) => {
                match message {
                    Some(msg) => tracing::debug!("Unable to find IP address (oid): {} ({})", data.id(), msg),
                    None => tracing::debug!("Unable to find IP address (oid): {}", data.id()),
                }
                Err(Error::not_found(LABEL, Self::mapping_name(data)))
            }
        }
    }

    async fn update(&self, _data: &mut ResourceData) -> Result<()> {
        Err(Error::unsupported_operation(LABEL, "update"))
    }

    async fn delete(&self, data: &mut ResourceData) -> Result<()> {
        let oid = self.edit("delete", data, "").await?;

        tracing::debug!("Deleted {} (oid): {}", LABEL, oid);
        data.clear_id();
        Ok(())
    }

    async fn import(&self, _id: &str) -> Result<ResourceData> {
        Err(Error::unsupported_operation(LABEL, "import"))
    }

    fn supports_update(&self) -> bool {
        false
    }
}

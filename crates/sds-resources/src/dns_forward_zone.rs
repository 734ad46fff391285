//! DNS forward zones
//!
//! A forward zone hands every query for a domain to a list of forwarders.
//! Server, view and name identify the zone and force a replacement; the
//! forwarding mode, forwarders and class can be edited in place.
//!
//! ## Wire mapping
//!
//! | field              | parameter                  |
//! |--------------------|----------------------------|
//! | `dnsserver`        | `dns_name`                 |
//! | `dnsview`          | `dnsview_name` (not `#`)   |
//! | `name`             | `dnszone_name`             |
//! | `forward`          | `dnszone_forward`          |
//! | `forwarders`       | `dnszone_forwarders`       |
//! | `class`            | `dnszone_class_name`       |
//! | `class_parameters` | `dnszone_class_parameters` |

use std::sync::Arc;

use sds_core::adapter::{ObjectMapping, ReadMode, RestObject, RestResource};
use sds_core::params::{self, Parameters};
use sds_core::response::{RemoteObject, field_str};
use sds_core::schema::{FieldSchema, Schema, Validator};
use sds_core::{ResourceData, Transport};

pub const TYPE_NAME: &str = "solidserver_dns_forward_zone";

/// View name meaning "no view"
const NO_VIEW: &str = "#";

/// Class parameters the appliance manages on its own
const INTERNAL_CLASS_PARAMS: &[&str] = &["dnsptr"];

static OBJECT: RestObject = RestObject::new(
    "DNS forward zone",
    "dnszone_id",
    "rest/dns_zone_add",
    "rest/dns_zone_info",
    "rest/dns_zone_delete",
);

/// Field mapping of a DNS forward zone
pub struct DnsForwardZone {
    schema: Schema,
}

impl DnsForwardZone {
    pub fn new() -> Self {
        Self {
            schema: Schema::new(vec![
                FieldSchema::string("dnsserver")
                    .required()
                    .force_new()
                    .describe("The managed SMART DNS server name, or DNS server name hosting the forward zone."),
                FieldSchema::string("dnsview")
                    .force_new()
                    .default(NO_VIEW)
                    .describe("The DNS view name hosting the forward zone."),
                FieldSchema::string("name")
                    .required()
                    .force_new()
                    .describe("The Domain Name served by the forward zone."),
                FieldSchema::string("forward")
                    .default("only")
                    .validate(Validator::OneOf {
                        values: &["first", "only"],
                        ignore_case: true,
                    })
                    .describe("The forwarding mode of the forward zone (Supported: only, first; Default: only)."),
                FieldSchema::list("forwarders")
                    .describe("The IP address list of the forwarder(s) to use for the forward zone."),
                FieldSchema::string("class")
                    .default("")
                    .describe("The class associated to the forward zone."),
                FieldSchema::map("class_parameters")
                    .describe("The class parameters associated to the forward zone."),
            ]),
        }
    }

    /// The lifecycle implementation bound to `transport`
    pub fn resource(transport: Arc<dyn Transport>) -> RestResource<Self> {
        RestResource::new(transport, Self::new())
    }

    /// Parameters shared by creation and edition
    fn settings(data: &ResourceData, params: &mut Parameters) {
        params
            .add("dnszone_class_name", data.get_str("class"))
            .add("dnszone_forward", data.get_str("forward").to_lowercase())
            .add(
                "dnszone_forwarders",
                params::join_list(&data.get_list("forwarders")),
            )
            .add(
                "dnszone_class_parameters",
                params::encode_class_params(&data.get_map("class_parameters")),
            );
    }
}

impl Default for DnsForwardZone {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectMapping for DnsForwardZone {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn object(&self) -> &RestObject {
        &OBJECT
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn create_params(&self, data: &ResourceData, params: &mut Parameters) {
        params.add("dns_name", data.get_str("dnsserver"));
        let view = data.get_str("dnsview");
        if view != NO_VIEW {
            params.add("dnsview_name", view);
        }
        params
            .add("dnszone_name", data.get_str("name"))
            .add("dnszone_type", "forward");
        Self::settings(data, params);
    }

    fn update_params(&self, data: &ResourceData, params: &mut Parameters) {
        Self::settings(data, params);
    }

    fn apply(&self, remote: &RemoteObject, data: &mut ResourceData, mode: ReadMode) {
        data.set("dnsserver", field_str(remote, "dns_name"));
        let view = match field_str(remote, "dnsview_name") {
            "" => NO_VIEW,
            view => view,
        };
        data.set("dnsview", view);
        data.set("name", field_str(remote, "dnszone_name"));

        let forward = match field_str(remote, "dnszone_forward") {
            "" => "none".to_string(),
            other => other.to_lowercase(),
        };
        data.set("forward", forward);

        // An empty list on the appliance leaves the local list alone
        let forwarders = field_str(remote, "dnszone_forwarders");
        if !forwarders.is_empty() || mode == ReadMode::Import {
            data.set_list("forwarders", params::split_list(forwarders));
        }

        data.set("class", field_str(remote, "dnszone_class_name"));

        let tracked = data.get_map("class_parameters");
        let retrieved =
            params::decode_class_params(field_str(remote, "dnszone_class_parameters"));
        data.set_map(
            "class_parameters",
            params::reconcile_class_params(tracked.keys(), &retrieved, INTERNAL_CLASS_PARAMS),
        );
    }
}

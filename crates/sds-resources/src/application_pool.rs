//! Application pools
//!
//! Application pools are groups of nodes serving the same application and
//! monitored by the GSLB DNS servers; the pool carries the traffic policy.
//! Available from SOLIDserver 7.1.0.

use std::sync::Arc;

use sds_core::adapter::{ObjectMapping, ReadMode, RestObject, RestResource};
use sds_core::params::Parameters;
use sds_core::response::{RemoteObject, field_str};
use sds_core::schema::{FieldSchema, Schema, Validator};
use sds_core::{ResourceData, Transport};

pub const TYPE_NAME: &str = "solidserver_app_pool";

/// Load balancing mode that uses `best_active_nodes`
const LATENCY: &str = "latency";

static OBJECT: RestObject = RestObject::new(
    "application pool",
    "apppool_id",
    "rest/app_pool_add",
    "rest/app_pool_info",
    "rest/app_pool_delete",
)
.min_version(710);

/// Field mapping of an application pool
pub struct ApplicationPool {
    schema: Schema,
}

impl ApplicationPool {
    pub fn new() -> Self {
        Self {
            schema: Schema::new(vec![
                FieldSchema::string("application")
                    .required()
                    .force_new()
                    .describe("The name of the application associated to the pool."),
                FieldSchema::string("fqdn")
                    .required()
                    .force_new()
                    .describe("The fqdn of the application associated to the pool."),
                FieldSchema::string("name")
                    .required()
                    .force_new()
                    .describe("The name of the application pool to create."),
                FieldSchema::string("ip_version")
                    .force_new()
                    .default("ipv4")
                    .describe("The IP protocol version used by the application pool (Supported: ipv4, ipv6; Default: ipv4)."),
                FieldSchema::string("lb_mode")
                    .default("round-robin")
                    .validate(Validator::OneOf {
                        values: &["weighted", "round-robin", "latency"],
                        ignore_case: false,
                    })
                    .describe("The load balancing mode of the application pool (Supported: weighted, round-robin, latency; Default: round-robin)."),
                FieldSchema::bool("affinity")
                    .default(false)
                    .describe("Enable session affinity for the application pool."),
                FieldSchema::int("affinity_session_duration")
                    .default(300)
                    .describe("The time each session is maintained in sec (Default: 300)."),
                FieldSchema::int("best_active_nodes")
                    .default(1)
                    .validate(Validator::IntAtLeast(1))
                    .describe("Number of best active nodes when lb_mode is set to latency."),
            ]),
        }
    }

    /// The lifecycle implementation bound to `transport`
    pub fn resource(transport: Arc<dyn Transport>) -> RestResource<Self> {
        RestResource::new(transport, Self::new())
    }

    fn settings(data: &ResourceData, params: &mut Parameters) {
        params
            .add("name", data.get_str("name"))
            .add("appapplication_name", data.get_str("application"))
            .add("appapplication_fqdn", data.get_str("fqdn"))
            .add("type", data.get_str("ip_version"))
            .add("lb_mode", data.get_str("lb_mode"));

        if data.get_bool("affinity") {
            params.add("affinity_state", "1").add(
                "affinity_session_time",
                data.get_i64("affinity_session_duration").to_string(),
            );
        } else {
            params.add("affinity_state", "0");
        }

        if data.get_str("lb_mode") == LATENCY {
            params.add(
                "best_active_nodes",
                data.get_i64("best_active_nodes").to_string(),
            );
        }
    }
}

impl Default for ApplicationPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Integer attribute; unparsable values read as 0
fn field_int(remote: &RemoteObject, key: &str) -> i64 {
    field_str(remote, key).trim().parse().unwrap_or_default()
}

impl ObjectMapping for ApplicationPool {
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
        Self::settings(data, params);
    }

    fn update_params(&self, data: &ResourceData, params: &mut Parameters) {
        Self::settings(data, params);
    }

    fn apply(&self, remote: &RemoteObject, data: &mut ResourceData, mode: ReadMode) {
        data.set("name", field_str(remote, "apppool_name"));
        data.set("application", field_str(remote, "appapplication_name"));
        data.set("fqdn", field_str(remote, "appapplication_fqdn"));
        data.set("lb_mode", field_str(remote, "apppool_lb_mode"));

        let affinity = field_str(remote, "apppool_affinity_state") != "0";
        data.set("affinity", affinity);
        if affinity {
            data.set(
                "affinity_session_duration",
                field_int(remote, "apppool_affinity_session_time"),
            );
        }

        if !field_str(remote, "apppool_best_active_nodes").is_empty() {
            data.set(
                "best_active_nodes",
                field_int(remote, "apppool_best_active_nodes"),
            );
        } else if mode == ReadMode::Import {
            data.set("best_active_nodes", 0);
        }
    }
}

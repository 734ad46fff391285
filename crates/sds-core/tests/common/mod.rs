//! Test doubles and common utilities for engine contract tests
//!
//! [`FakeAppliance`] is an in-memory REST gateway that stores "widget"
//! objects the way the appliance stores its own: form parameters in, JSON
//! arrays out. [`widget_registry`] wires it to a minimal mapping.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sds_core::adapter::{ObjectMapping, ReadMode, RestObject, RestResource};
use sds_core::error::Result;
use sds_core::response::{RemoteObject, field_str};
use sds_core::schema::{FieldSchema, Schema};
use sds_core::{Method, Parameters, RawResponse, ResourceData, ResourceRegistry, Transport};
use serde_json::{Value, json};

pub const WIDGET_TYPE: &str = "test_widget";

/// In-memory appliance serving the `rest/widget_*` family
pub struct FakeAppliance {
    objects: Mutex<BTreeMap<String, RemoteObject>>,
    next_oid: AtomicUsize,
    /// Answer every call with an empty 500
    outage: AtomicBool,
    calls: Mutex<Vec<(Method, String)>>,
}

impl FakeAppliance {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            objects: Mutex::new(BTreeMap::new()),
            next_oid: AtomicUsize::new(100),
            outage: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn set_outage(&self, outage: bool) {
        self.outage.store(outage, Ordering::SeqCst);
    }

    /// Attributes of a stored object
    pub fn object(&self, oid: &str) -> Option<RemoteObject> {
        self.objects.lock().unwrap().get(oid).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    /// Remove an object behind the engine's back
    pub fn remove(&self, oid: &str) {
        self.objects.lock().unwrap().remove(oid);
    }

    /// Every call so far as (method, path)
    pub fn calls(&self) -> Vec<(Method, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, method: Method, path: &str) -> usize {
        self.calls()
            .iter()
            .filter(|(m, p)| *m == method && p == path)
            .count()
    }

    fn attributes(params: &Parameters) -> RemoteObject {
        let mut object = RemoteObject::new();
        object.insert(
            "widget_name".to_string(),
            json!(params.get("widget_name").unwrap_or_default()),
        );
        object.insert(
            "widget_comment".to_string(),
            json!(params.get("widget_comment").unwrap_or_default()),
        );
        object
    }

    fn error(status: u16, message: &str) -> RawResponse {
        RawResponse::new(status, json!([{ "errmsg": message }]).to_string())
    }

    fn accepted(oid: &str) -> RawResponse {
        RawResponse::new(201, json!([{ "ret_oid": oid }]).to_string())
    }
}

#[async_trait]
impl Transport for FakeAppliance {
    async fn request(&self, method: Method, path: &str, params: &Parameters) -> Result<RawResponse> {
        self.calls.lock().unwrap().push((method, path.to_string()));

        if self.outage.load(Ordering::SeqCst) {
            return Ok(RawResponse::new(500, ""));
        }

        let mut objects = self.objects.lock().unwrap();
        let response = match (method, path) {
            (Method::Post, "rest/widget_add") => {
                let name = params.get("widget_name").unwrap_or_default();
                if objects.values().any(|o| field_str(o, "widget_name") == name) {
                    Self::error(400, "Widget already exists")
                } else {
                    let oid = self.next_oid.fetch_add(1, Ordering::SeqCst).to_string();
                    objects.insert(oid.clone(), Self::attributes(params));
                    Self::accepted(&oid)
                }
            }
            (Method::Put, "rest/widget_add") => {
                let oid = params.get("widget_id").unwrap_or_default();
                match objects.get_mut(oid) {
                    Some(object) => {
                        *object = Self::attributes(params);
                        Self::accepted(oid)
                    }
                    None => Self::error(400, "Widget not found"),
                }
            }
            (Method::Get, "rest/widget_info") => {
                let oid = params.get("widget_id").unwrap_or_default();
                match objects.get(oid) {
                    Some(object) => RawResponse::new(200, Value::Array(vec![Value::Object(object.clone())]).to_string()),
                    None => RawResponse::new(204, ""),
                }
            }
            (Method::Delete, "rest/widget_delete") => {
                let oid = params.get("widget_id").unwrap_or_default();
                match objects.remove(oid) {
                    Some(_) => RawResponse::new(200, json!([{ "ret_oid": oid }]).to_string()),
                    None => Self::error(400, "Widget not found"),
                }
            }
            _ => Self::error(404, "Unknown service"),
        };

        Ok(response)
    }

    fn version(&self) -> u32 {
        800
    }
}

/// Mapping for the fake widget family: `name` forces replacement,
/// `comment` is edited in place
pub struct WidgetMapping {
    object: RestObject,
    schema: Schema,
}

impl WidgetMapping {
    pub fn new() -> Self {
        Self {
            object: RestObject::new(
                "widget",
                "widget_id",
                "rest/widget_add",
                "rest/widget_info",
                "rest/widget_delete",
            ),
            schema: Schema::new(vec![
                FieldSchema::string("name").required().force_new(),
                FieldSchema::string("comment"),
            ]),
        }
    }
}

impl ObjectMapping for WidgetMapping {
    fn type_name(&self) -> &'static str {
        WIDGET_TYPE
    }

    fn object(&self) -> &RestObject {
        &self.object
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn create_params(&self, data: &ResourceData, params: &mut Parameters) {
        params
            .add("widget_name", data.get_str("name"))
            .add("widget_comment", data.get_str("comment"));
    }

    fn update_params(&self, data: &ResourceData, params: &mut Parameters) {
        self.create_params(data, params);
    }

    fn apply(&self, remote: &RemoteObject, data: &mut ResourceData, _mode: ReadMode) {
        data.set("name", field_str(remote, "widget_name"));
        data.set("comment", field_str(remote, "widget_comment"));
    }
}

/// Registry with the widget type bound to `appliance`
pub fn widget_registry(appliance: Arc<FakeAppliance>) -> Arc<ResourceRegistry> {
    let registry = ResourceRegistry::new();
    registry.register_resource(Arc::new(RestResource::new(appliance, WidgetMapping::new())));
    Arc::new(registry)
}

/// Widget configuration as the user would write it
pub fn widget(name: &str, comment: &str) -> Value {
    json!({ "name": name, "comment": comment })
}

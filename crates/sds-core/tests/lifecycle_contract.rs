//! Architectural Contract Test: Resource Lifecycle
//!
//! Verifies that the engine picks the right lifecycle operation for a
//! desired configuration and records what the appliance answered.
//!
//! Constraints verified:
//! - No state → create, and the returned oid is persisted
//! - Unchanged configuration → no write reaches the appliance
//! - Updatable change → in-place edit with the same oid
//! - Force-new change → delete then create
//! - Destroy removes both the remote object and the local record
//! - Import adopts an existing object

mod common;

use common::*;
use sds_core::traits::StateStore;
use sds_core::{ApplyOutcome, Engine, Error, MemoryStateStore, Method};

fn new_engine(appliance: std::sync::Arc<FakeAppliance>) -> Engine {
    Engine::new(widget_registry(appliance), Box::new(MemoryStateStore::new()))
}

#[tokio::test]
async fn first_apply_creates_and_persists_oid() {
    let appliance = FakeAppliance::new();
    let engine = new_engine(appliance.clone());

    let outcome = engine
        .apply("widgets.a", WIDGET_TYPE, &widget("a", "first"))
        .await
        .unwrap();

    let ApplyOutcome::Created { id } = outcome else {
        panic!("expected a creation");
    };
    let record = engine.state("widgets.a").await.unwrap().unwrap();
    assert_eq!(record.resource_type, WIDGET_TYPE);
    assert_eq!(record.data.id(), id);
    assert_eq!(record.data.get_str("comment"), "first");
    assert!(appliance.object(&id).is_some());
}

#[tokio::test]
async fn unchanged_configuration_sends_no_write() {
    let appliance = FakeAppliance::new();
    let engine = new_engine(appliance.clone());

    engine
        .apply("widgets.a", WIDGET_TYPE, &widget("a", "same"))
        .await
        .unwrap();
    let outcome = engine
        .apply("widgets.a", WIDGET_TYPE, &widget("a", "same"))
        .await
        .unwrap();

    assert!(matches!(outcome, ApplyOutcome::Unchanged { .. }));
    assert_eq!(appliance.calls().len(), 1, "only the creation reaches the appliance");
}

#[tokio::test]
async fn updatable_change_edits_in_place() {
    let appliance = FakeAppliance::new();
    let engine = new_engine(appliance.clone());

    let created = engine
        .apply("widgets.a", WIDGET_TYPE, &widget("a", "before"))
        .await
        .unwrap();
    let updated = engine
        .apply("widgets.a", WIDGET_TYPE, &widget("a", "after"))
        .await
        .unwrap();

    assert_eq!(updated, ApplyOutcome::Updated { id: created.id().to_string() });
    assert_eq!(appliance.call_count(Method::Put, "rest/widget_add"), 1);
    let remote = appliance.object(created.id()).unwrap();
    assert_eq!(remote["widget_comment"], "after");
}

#[tokio::test]
async fn force_new_change_replaces_object() {
    let appliance = FakeAppliance::new();
    let engine = new_engine(appliance.clone());

    let created = engine
        .apply("widgets.a", WIDGET_TYPE, &widget("a", "c"))
        .await
        .unwrap();
    let replaced = engine
        .apply("widgets.a", WIDGET_TYPE, &widget("b", "c"))
        .await
        .unwrap();

    match replaced {
        ApplyOutcome::Replaced {
            previous_id,
            id,
            changed,
        } => {
            assert_eq!(previous_id, created.id());
            assert_ne!(id, previous_id);
            assert_eq!(changed, vec!["name"]);
        }
        other => panic!("expected a replacement, got {:?}", other),
    }

    // Delete happens before the new creation
    let calls = appliance.calls();
    assert_eq!(calls[1], (Method::Delete, "rest/widget_delete".to_string()));
    assert_eq!(calls[2], (Method::Post, "rest/widget_add".to_string()));
    assert_eq!(appliance.object_count(), 1);
}

#[tokio::test]
async fn rejected_create_leaves_no_state() {
    let appliance = FakeAppliance::new();
    let engine = new_engine(appliance.clone());

    engine
        .apply("widgets.a", WIDGET_TYPE, &widget("dup", ""))
        .await
        .unwrap();
    let err = engine
        .apply("widgets.b", WIDGET_TYPE, &widget("dup", ""))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Unable to create widget: dup (Widget already exists)"
    );
    assert!(engine.state("widgets.b").await.unwrap().is_none());
}

#[tokio::test]
async fn invalid_configuration_never_reaches_appliance() {
    let appliance = FakeAppliance::new();
    let engine = new_engine(appliance.clone());

    let err = engine
        .apply("widgets.a", WIDGET_TYPE, &serde_json::json!({ "comment": "no name" }))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(appliance.calls().is_empty());
}

#[tokio::test]
async fn unknown_type_is_rejected() {
    let engine = new_engine(FakeAppliance::new());

    let err = engine
        .apply("x", "solidserver_unknown", &widget("a", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Registry(_)));
}

#[tokio::test]
async fn destroy_removes_remote_object_and_record() {
    let appliance = FakeAppliance::new();
    let engine = new_engine(appliance.clone());

    engine
        .apply("widgets.a", WIDGET_TYPE, &widget("a", ""))
        .await
        .unwrap();
    engine.destroy("widgets.a").await.unwrap();

    assert_eq!(appliance.object_count(), 0);
    assert!(engine.state("widgets.a").await.unwrap().is_none());
    assert!(engine.addresses().await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_destroy_keeps_record() {
    let appliance = FakeAppliance::new();
    let engine = new_engine(appliance.clone());

    let created = engine
        .apply("widgets.a", WIDGET_TYPE, &widget("a", ""))
        .await
        .unwrap();
    appliance.remove(created.id());

    let err = engine.destroy("widgets.a").await.unwrap_err();

    assert_eq!(err.to_string(), "Unable to delete widget: a (Widget not found)");
    assert!(engine.state("widgets.a").await.unwrap().is_some());
}

#[tokio::test]
async fn import_adopts_existing_object() {
    let appliance = FakeAppliance::new();
    let first = new_engine(appliance.clone());
    let created = first
        .apply("widgets.a", WIDGET_TYPE, &widget("a", "made elsewhere"))
        .await
        .unwrap();

    let second = new_engine(appliance.clone());
    let record = second
        .import("adopted", WIDGET_TYPE, created.id())
        .await
        .unwrap();

    assert_eq!(record.data.id(), created.id());
    assert_eq!(record.data.get_str("comment"), "made elsewhere");

    // The adopted object is now managed like any other
    let outcome = second
        .apply("adopted", WIDGET_TYPE, &widget("a", "made elsewhere"))
        .await
        .unwrap();
    assert!(matches!(outcome, ApplyOutcome::Unchanged { .. }));
}

#[tokio::test]
async fn import_of_unknown_oid_is_a_hard_error() {
    let engine = new_engine(FakeAppliance::new());

    let err = engine.import("ghost", WIDGET_TYPE, "999").await.unwrap_err();

    assert_eq!(err.to_string(), "Unable to find and import widget (oid): 999");
    assert!(engine.state("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn import_refuses_managed_address() {
    let appliance = FakeAppliance::new();
    let engine = new_engine(appliance.clone());
    let created = engine
        .apply("widgets.a", WIDGET_TYPE, &widget("a", ""))
        .await
        .unwrap();

    assert!(engine.import("widgets.a", WIDGET_TYPE, created.id()).await.is_err());
}

#[tokio::test]
async fn state_store_sees_engine_writes() {
    let appliance = FakeAppliance::new();
    let store = MemoryStateStore::new();
    let engine = Engine::new(widget_registry(appliance), Box::new(store.clone()));

    engine
        .apply("widgets.a", WIDGET_TYPE, &widget("a", ""))
        .await
        .unwrap();

    assert_eq!(store.list().await.unwrap(), vec!["widgets.a"]);
}

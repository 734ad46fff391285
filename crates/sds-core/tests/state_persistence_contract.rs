//! Architectural Contract Test: State Persistence
//!
//! Verifies that engine state survives restarts when backed by the file
//! store, so a second run does not re-create what the first one made.
//!
//! Constraints verified:
//! - Records written by one engine are visible to the next
//! - Re-applying the same configuration after a restart sends no writes
//! - Destroy is persisted

mod common;

use common::*;
use sds_core::{ApplyOutcome, Engine, FileStateStore, Method};
use tempfile::tempdir;

#[tokio::test]
async fn restart_does_not_recreate_objects() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    let appliance = FakeAppliance::new();

    let created = {
        let store = FileStateStore::new(&path).await.unwrap();
        let engine = Engine::new(widget_registry(appliance.clone()), Box::new(store));
        let outcome = engine
            .apply("widgets.a", WIDGET_TYPE, &widget("a", "c"))
            .await
            .unwrap();
        engine.flush().await.unwrap();
        outcome
    };

    let store = FileStateStore::new(&path).await.unwrap();
    let engine = Engine::new(widget_registry(appliance.clone()), Box::new(store));
    let outcome = engine
        .apply("widgets.a", WIDGET_TYPE, &widget("a", "c"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ApplyOutcome::Unchanged {
            id: created.id().to_string()
        }
    );
    assert_eq!(appliance.call_count(Method::Post, "rest/widget_add"), 1);
}

#[tokio::test]
async fn destroy_is_persisted_across_restarts() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    let appliance = FakeAppliance::new();

    {
        let store = FileStateStore::new(&path).await.unwrap();
        let engine = Engine::new(widget_registry(appliance.clone()), Box::new(store));
        engine
            .apply("widgets.a", WIDGET_TYPE, &widget("a", ""))
            .await
            .unwrap();
        engine
            .apply("widgets.b", WIDGET_TYPE, &widget("b", ""))
            .await
            .unwrap();
        engine.destroy("widgets.a").await.unwrap();
    }

    let store = FileStateStore::new(&path).await.unwrap();
    let engine = Engine::new(widget_registry(appliance), Box::new(store));
    assert_eq!(engine.addresses().await.unwrap(), vec!["widgets.b"]);
}

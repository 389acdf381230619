mod common;

use octofhir_fhir_resources::*;
use serde_json::json;
use std::sync::Arc;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_shared_types_are_thread_safe() {
    assert_send_sync::<ModelResolver>();
    assert_send_sync::<SchemaRegistry>();
    assert_send_sync::<Instance>();
    assert_send_sync::<FhirResourceError>();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_resolves_share_one_registry() {
    let resolver = common::resolver(FhirRelease::R4B);

    let mut handles = Vec::new();
    for i in 0..64 {
        let resolver = resolver.clone();
        handles.push(tokio::spawn(async move {
            let doc = if i % 2 == 0 {
                json!({"resourceType": "Patient", "id": format!("p{i}"), "gender": "female"})
            } else {
                json!({"resourceType": "Patient", "id": format!("p{i}"), "gender": "robot"})
            };
            resolver.parse(doc)
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.await.unwrap();
        if i % 2 == 0 {
            let patient = result.unwrap();
            assert_eq!(patient.id(), Some(format!("p{i}").as_str()));
        } else {
            let err = result.unwrap_err();
            assert_eq!(err.violations().len(), 1);
            assert_eq!(err.violations()[0].path, "gender");
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_catalog_initialises_once() {
    let mut handles = Vec::new();
    for _ in 0..16 {
        handles.push(tokio::task::spawn_blocking(|| {
            catalog::shared_registry(FhirRelease::Stu3).unwrap()
        }));
    }

    let mut registries = Vec::new();
    for handle in handles {
        registries.push(handle.await.unwrap());
    }
    let first = &registries[0];
    assert!(first.is_sealed());
    assert!(registries.iter().all(|r| Arc::ptr_eq(r, first)));
}

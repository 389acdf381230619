use octofhir_fhir_resources::*;
use serde_json::{Value, json};
use std::sync::Arc;

pub const DATA_ABSENT_REASON: &str = "http://hl7.org/fhir/StructureDefinition/data-absent-reason";

/// Route `tracing` output through the test harness, filtered by `RUST_LOG`
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[allow(dead_code)]
pub fn resolver(release: FhirRelease) -> ModelResolver {
    init_tracing();
    ModelResolver::for_release(release).unwrap()
}

/// `_x` sidecar explaining a missing value
#[allow(dead_code)]
pub fn absent_sidecar(code: &str) -> Value {
    json!({"extension": [{"url": DATA_ABSENT_REASON, "valueCode": code}]})
}

#[allow(dead_code)]
pub fn absent_carrier(code: &str) -> ExtensionCarrier {
    ExtensionCarrier::new().with_url_value(DATA_ABSENT_REASON, "valueCode", json!(code))
}

/// R4B catalog plus a `Roster` resource whose `subject` accepts only Patient or Group
#[allow(dead_code)]
pub fn roster_resolver() -> ModelResolver {
    init_tracing();
    let registry = SchemaRegistry::new(FhirRelease::R4B);
    registry
        .register_all(catalog::descriptors_for(FhirRelease::R4B))
        .unwrap();
    registry
        .register(
            SchemaDescriptor::resource("Roster", FhirRelease::R4B)
                .with_base("DomainResource")
                .with_field(
                    FieldDescriptor::polymorphic_of("subject", "Resource", ["Patient", "Group"])
                        .required(),
                )
                .with_field(FieldDescriptor::polymorphic_of("entry", "Resource", ["Group"]).repeated()),
        )
        .unwrap();
    registry.seal().unwrap();
    ModelResolver::new(Arc::new(registry), ModelConfig::for_release(FhirRelease::R4B)).unwrap()
}

/// Kinds and paths of a failed resolve, in report order
#[allow(dead_code)]
pub fn violations_of(result: Result<Instance>) -> Vec<(String, ViolationKind)> {
    match result {
        Ok(instance) => panic!("expected a validation failure, got {}", instance.type_name()),
        Err(err) => {
            assert!(err.is_validation(), "expected a validation failure, got {err}");
            err.violations()
                .iter()
                .map(|v| (v.path.clone(), v.kind))
                .collect()
        }
    }
}

mod common;

use octofhir_fhir_resources::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{Value, json};

fn assert_round_trip(release: FhirRelease, doc: Value) {
    let resolver = common::resolver(release);
    let parsed = resolver.parse(doc.clone()).unwrap();
    let structured = resolver.to_structured(&parsed).unwrap();
    assert_eq!(structured, doc);

    let reparsed = from_structured(&resolver, structured).unwrap();
    assert_eq!(reparsed, parsed);
}

#[test]
fn test_dstu2_patient() {
    assert_round_trip(
        FhirRelease::Dstu2,
        json!({
            "resourceType": "Patient",
            "id": "example",
            "active": true,
            "name": [{"use": "official", "family": ["Chalmers", "Windsor"], "given": ["Peter", "James"]}],
            "gender": "male",
            "birthDate": "1974-12-25",
            "deceasedBoolean": false,
            "careProvider": [{"reference": "Organization/1"}]
        }),
    );
}

#[test]
fn test_dstu2_observation_with_single_category() {
    assert_round_trip(
        FhirRelease::Dstu2,
        json!({
            "resourceType": "Observation",
            "status": "final",
            "category": {"coding": [{"system": "http://hl7.org/fhir/observation-category", "code": "vital-signs"}]},
            "code": {"text": "Body weight"},
            "subject": {"reference": "Patient/example"},
            "effectiveDateTime": "2016-03-28",
            "valueQuantity": {"value": 185, "unit": "lbs", "system": "http://unitsofmeasure.org", "code": "[lb_av]"}
        }),
    );
}

#[test]
fn test_stu3_bundle_with_mixed_entries() {
    assert_round_trip(
        FhirRelease::Stu3,
        json!({
            "resourceType": "Bundle",
            "type": "collection",
            "entry": [
                {"fullUrl": "urn:uuid:1", "resource": {"resourceType": "Patient", "id": "a", "gender": "female"}},
                {"resource": {"resourceType": "PaymentNotice", "id": "pn"}},
                {"resource": {
                    "resourceType": "Observation",
                    "status": "amended",
                    "code": {"text": "Heart rate"},
                    "valueQuantity": {"value": 72.5, "unit": "beats/minute"}
                }}
            ]
        }),
    );
}

#[test]
fn test_r4b_required_status_explained_by_extension() {
    assert_round_trip(
        FhirRelease::R4B,
        json!({
            "resourceType": "Observation",
            "_status": common::absent_sidecar("unknown"),
            "code": {"text": "Glucose"},
            "valueRatio": {
                "numerator": {"value": 1},
                "denominator": {"resourceType": "SimpleQuantity", "value": 3}
            }
        }),
    );
}

#[test]
fn test_r5_substance_with_ingredient_choice() {
    assert_round_trip(
        FhirRelease::R5,
        json!({
            "resourceType": "Substance",
            "instance": true,
            "code": {"concept": {"text": "saline"}},
            "ingredient": [
                {"substanceReference": {"reference": "Substance/nacl"}},
                {"quantity": {"numerator": {"value": 0.9}}, "substanceCodeableConcept": {"text": "water"}}
            ]
        }),
    );
}

#[test]
fn test_parameters_with_nested_resource() {
    assert_round_trip(
        FhirRelease::R4B,
        json!({
            "resourceType": "Parameters",
            "parameter": [
                {"name": "count", "valueInteger": 3},
                {"name": "price", "valueMoney": {"value": 9.99, "currency": "EUR"}},
                {"name": "patient", "resource": {"resourceType": "Patient", "id": "p"}}
            ]
        }),
    );
}

#[test]
fn test_input_key_order_is_not_preserved() {
    let resolver = common::resolver(FhirRelease::R4B);
    let patient = resolver
        .parse(r#"{"gender":"other","resourceType":"Patient","birthDate":"2001-02-03","id":"p"}"#)
        .unwrap();
    let text = resolver.to_json_string(&patient).unwrap();
    assert_eq!(
        text,
        r#"{"resourceType":"Patient","id":"p","gender":"other","birthDate":"2001-02-03"}"#
    );

    let pretty = to_json_string_pretty(resolver.registry(), &patient).unwrap();
    assert!(pretty.starts_with("{\n  \"resourceType\": \"Patient\""));
}

#[test]
fn test_writer_refuses_foreign_release() {
    let r4b = common::resolver(FhirRelease::R4B);
    let r5 = common::resolver(FhirRelease::R5);
    let patient = r4b.parse(json!({"resourceType": "Patient"})).unwrap();
    assert!(matches!(
        r5.to_structured(&patient),
        Err(FhirResourceError::UnknownType { .. })
    ));
}

fn birth_date() -> impl Strategy<Value = String> {
    (1900u32..2100, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| format!("{y:04}-{m:02}-{d:02}"))
}

fn deceased() -> impl Strategy<Value = Option<(&'static str, Value)>> {
    prop_oneof![
        Just(None),
        any::<bool>().prop_map(|b| Some(("deceasedBoolean", json!(b)))),
        birth_date().prop_map(|d| Some(("deceasedDateTime", json!(d)))),
    ]
}

prop_compose! {
    fn patient_doc()(
        active in proptest::option::of(any::<bool>()),
        gender in proptest::option::of(prop::sample::select(vec!["male", "female", "other", "unknown"])),
        birth in proptest::option::of(birth_date()),
        birth_explained in any::<bool>(),
        given in proptest::collection::vec("[A-Z][a-z]{1,8}", 0..3),
        deceased in deceased(),
    ) -> Value {
        let mut doc = json!({"resourceType": "Patient"});
        if let Some(active) = active {
            doc["active"] = json!(active);
        }
        if !given.is_empty() {
            doc["name"] = json!([{"given": given}]);
        }
        if let Some(gender) = gender {
            doc["gender"] = json!(gender);
        }
        if let Some(birth) = birth {
            doc["birthDate"] = json!(birth);
        }
        if birth_explained {
            doc["_birthDate"] = json!({"id": "bd"});
        }
        if let Some((member, value)) = deceased {
            doc[member] = value;
        }
        doc
    }
}

proptest! {
    #[test]
    fn prop_patient_round_trip(doc in patient_doc()) {
        let resolver = ModelResolver::for_release(FhirRelease::R4B).unwrap();
        let parsed = resolver.parse(doc.clone()).unwrap();
        let structured = resolver.to_structured(&parsed).unwrap();
        prop_assert_eq!(&structured, &doc);
        prop_assert_eq!(resolver.parse(structured).unwrap(), parsed);
    }
}

#[test]
fn test_top_level_data_types_keep_their_type() {
    let resolver = common::resolver(FhirRelease::R4B);

    let age = resolver
        .parse_as("Quantity", json!({"resourceType": "Age", "value": 42, "unit": "a"}))
        .unwrap();
    let structured = resolver.to_structured(&age).unwrap();
    assert_eq!(structured, json!({"resourceType": "Age", "value": 42, "unit": "a"}));
    assert_eq!(resolver.parse_as("Quantity", structured).unwrap(), age);

    let simple = resolver
        .parse_as("Quantity", json!({"resourceType": "SimpleQuantity", "value": 3}))
        .unwrap();
    let back = resolver
        .parse_as("Quantity", resolver.to_structured(&simple).unwrap())
        .unwrap();
    assert_eq!(back.type_name(), "SimpleQuantity");

    let quantity = resolver.parse_as("Quantity", json!({"value": 5.5})).unwrap();
    let structured = resolver.to_structured(&quantity).unwrap();
    assert_eq!(structured, json!({"value": 5.5}));
    assert_eq!(resolver.parse_as("Quantity", structured).unwrap(), quantity);
}

#[test]
fn test_custom_discriminator_key_round_trips() {
    let resolver = ModelResolver::new(
        catalog::shared_registry(FhirRelease::R4B).unwrap(),
        ModelConfig::for_release(FhirRelease::R4B).with_discriminator_key("kind"),
    )
    .unwrap();
    let doc = json!({"kind": "Patient", "id": "p", "active": true});

    let patient = resolver.parse(doc.clone()).unwrap();
    let structured = resolver.to_structured(&patient).unwrap();
    assert_eq!(structured, doc);
    assert_eq!(from_structured(&resolver, structured).unwrap(), patient);

    let default_keyed = to_structured(resolver.registry(), &patient).unwrap();
    assert_eq!(default_keyed["resourceType"], "Patient");
    assert!(default_keyed.get("kind").is_none());
}

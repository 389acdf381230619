//! Structured output of validated instances.
//!
//! Keys follow the flattened element order of each type, never the order of the
//! input. Reading the output back through the resolver yields an equal instance.

use serde_json::{Map, Value};

use crate::core::ModelConfig;
use crate::error::{FhirResourceError, Result};
use crate::model::{FieldValue, Instance, PrimitiveElement};
use crate::resolver::ModelResolver;
use crate::types::{FieldDescriptor, FieldKind, SchemaRegistry};

/// Writes instances back to nested JSON using the registry layouts
#[derive(Debug, Clone, Copy)]
pub struct StructuredWriter<'r> {
    registry: &'r SchemaRegistry,
    discriminator_key: &'r str,
}

impl<'r> StructuredWriter<'r> {
    pub fn new(registry: &'r SchemaRegistry, discriminator_key: &'r str) -> Self {
        Self {
            registry,
            discriminator_key,
        }
    }

    pub fn write(&self, instance: &Instance) -> Result<Value> {
        let tagged = instance.is_resource() || self.specialises_concrete(instance.type_name());
        self.write_node(instance, tagged)
    }

    // A root such as `Age` must keep its type, a root such as `Quantity` needs none
    fn specialises_concrete(&self, type_name: &str) -> bool {
        self.registry
            .get(type_name)
            .and_then(|descriptor| descriptor.base_type.clone())
            .and_then(|base| self.registry.get(&base))
            .is_some_and(|base| !base.is_abstract)
    }

    fn write_node(&self, instance: &Instance, with_discriminator: bool) -> Result<Value> {
        if instance.release() != self.registry.release() {
            return Err(FhirResourceError::unknown_type(
                instance.type_name(),
                self.registry.release(),
            ));
        }
        let layout = self.registry.layout(instance.type_name())?;

        let mut map = Map::new();
        if with_discriminator {
            map.insert(
                self.discriminator_key.to_string(),
                Value::String(instance.type_name().to_string()),
            );
        }

        for field in &layout.fields {
            let Some(value) = instance.get(&field.name) else {
                continue;
            };
            match value {
                FieldValue::Primitive(element) => {
                    if let Some(value) = &element.value {
                        map.insert(field.name.clone(), value.to_json());
                    }
                    if let Some(carrier) = &element.extension {
                        map.insert(field.sidecar_name(), carrier.to_json());
                    }
                }
                FieldValue::PrimitiveList(elements) => {
                    write_primitive_list(&mut map, field, elements);
                }
                FieldValue::Composite(child) => {
                    let tagged = needs_discriminator(field, child);
                    map.insert(field.name.clone(), self.write_node(child, tagged)?);
                }
                FieldValue::CompositeList(children) if children.is_empty() => {}
                FieldValue::CompositeList(children) => {
                    let items = children
                        .iter()
                        .map(|child| self.write_node(child, needs_discriminator(field, child)))
                        .collect::<Result<Vec<_>>>()?;
                    map.insert(field.name.clone(), Value::Array(items));
                }
            }
        }
        Ok(Value::Object(map))
    }
}

/// Values and sidecars as two index-aligned arrays, each emitted only when it
/// has content
fn write_primitive_list(map: &mut Map<String, Value>, field: &FieldDescriptor, elements: &[PrimitiveElement]) {
    if elements.iter().any(|e| e.value.is_some()) {
        let values = elements
            .iter()
            .map(|e| e.value.as_ref().map_or(Value::Null, |v| v.to_json()))
            .collect();
        map.insert(field.name.clone(), Value::Array(values));
    }
    if elements.iter().any(|e| e.extension.is_some()) {
        let carriers = elements
            .iter()
            .map(|e| e.extension.as_ref().map_or(Value::Null, |c| c.to_json()))
            .collect();
        map.insert(field.sidecar_name(), Value::Array(carriers));
    }
}

// A child needs its type on the wire unless the slot's declared type implies it
fn needs_discriminator(field: &FieldDescriptor, child: &Instance) -> bool {
    if child.is_resource() {
        return true;
    }
    match &field.kind {
        FieldKind::Composite { type_name } => type_name != child.type_name(),
        _ => true,
    }
}

/// Nested JSON form of `instance` with the default `resourceType` key.
///
/// A resolver configured with another discriminator key must use
/// [`ModelResolver::to_structured`] instead to stay the inverse of [`from_structured`].
pub fn to_structured(registry: &SchemaRegistry, instance: &Instance) -> Result<Value> {
    let config = ModelConfig::default();
    StructuredWriter::new(registry, &config.discriminator_key).write(instance)
}

pub fn to_json_string(registry: &SchemaRegistry, instance: &Instance) -> Result<String> {
    Ok(serde_json::to_string(&to_structured(registry, instance)?)?)
}

pub fn to_json_string_pretty(registry: &SchemaRegistry, instance: &Instance) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_structured(registry, instance)?)?)
}

/// Resolve a nested JSON document of any resource type, reading the discriminator
/// under the key configured on `resolver`. Inverse of [`ModelResolver::to_structured`].
pub fn from_structured(resolver: &ModelResolver, value: Value) -> Result<Instance> {
    resolver.parse(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FhirRelease;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_output_follows_element_order() {
        let resolver = ModelResolver::for_release(FhirRelease::R4B).unwrap();
        let patient = resolver
            .parse(json!({
                "gender": "female",
                "active": true,
                "id": "p1",
                "resourceType": "Patient"
            }))
            .unwrap();

        let out = to_json_string(resolver.registry(), &patient).unwrap();
        assert_eq!(
            out,
            r#"{"resourceType":"Patient","id":"p1","active":true,"gender":"female"}"#
        );
    }

    #[test]
    fn test_repeated_sidecars_stay_aligned() {
        let resolver = ModelResolver::for_release(FhirRelease::R5).unwrap();
        let doc = json!({
            "resourceType": "Patient",
            "name": [{
                "given": ["Ann", null],
                "_given": [null, {"extension": [{"url": "http://example.org/why", "valueCode": "masked"}]}]
            }]
        });
        let patient = resolver.parse(doc.clone()).unwrap();
        assert_eq!(resolver.to_structured(&patient).unwrap(), doc);
    }

    #[test]
    fn test_specialised_child_keeps_its_type() {
        let resolver = ModelResolver::for_release(FhirRelease::R4B).unwrap();
        let doc = json!({
            "resourceType": "Observation",
            "status": "final",
            "code": {"text": "age"},
            "valueQuantity": {"resourceType": "Age", "value": 42, "unit": "a"}
        });
        let observation = resolver.parse(doc.clone()).unwrap();
        let age = observation.child("valueQuantity").unwrap();
        assert_eq!(age.type_name(), "Age");
        assert_eq!(resolver.to_structured(&observation).unwrap(), doc);
    }
}

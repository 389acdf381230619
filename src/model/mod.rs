//! Validated object graphs.
//!
//! An [`Instance`] is only ever produced by the resolver, after every rule of its
//! schema passed. It owns its children and is immutable afterwards.

pub mod draft;

pub use draft::InstanceDraft;

use indexmap::IndexMap;

use crate::core::FhirRelease;
use crate::types::{ExtensionCarrier, PrimitiveValue};

/// One primitive element: a value, its sidecar, or both
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PrimitiveElement {
    pub value: Option<PrimitiveValue>,
    pub extension: Option<ExtensionCarrier>,
}

impl PrimitiveElement {
    pub fn new(value: PrimitiveValue) -> Self {
        Self {
            value: Some(value),
            extension: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.extension.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Primitive(PrimitiveElement),
    PrimitiveList(Vec<PrimitiveElement>),
    Composite(Box<Instance>),
    CompositeList(Vec<Instance>),
}

impl FieldValue {
    pub fn as_primitive(&self) -> Option<&PrimitiveElement> {
        match self {
            FieldValue::Primitive(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            FieldValue::Composite(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FieldValue::Primitive(_) | FieldValue::Composite(_) => 1,
            FieldValue::PrimitiveList(items) => items.len(),
            FieldValue::CompositeList(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Node of a validated object graph
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    type_name: String,
    release: FhirRelease,
    is_resource: bool,
    fields: IndexMap<String, FieldValue>,
    // choice group name -> bound member field
    active_choices: IndexMap<String, String>,
}

impl Instance {
    pub(crate) fn new(
        type_name: impl Into<String>,
        release: FhirRelease,
        is_resource: bool,
        fields: IndexMap<String, FieldValue>,
        active_choices: IndexMap<String, String>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            release,
            is_resource,
            fields,
            active_choices,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn release(&self) -> FhirRelease {
        self.release
    }

    pub fn is_resource(&self) -> bool {
        self.is_resource
    }

    /// Populated fields keyed by wire name, in element order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn primitive(&self, name: &str) -> Option<&PrimitiveValue> {
        self.get(name)?.as_primitive()?.value.as_ref()
    }

    pub fn str_value(&self, name: &str) -> Option<&str> {
        self.primitive(name)?.as_str()
    }

    /// Sidecar of a single-valued primitive
    pub fn extension(&self, name: &str) -> Option<&ExtensionCarrier> {
        self.get(name)?.as_primitive()?.extension.as_ref()
    }

    pub fn child(&self, name: &str) -> Option<&Instance> {
        self.get(name)?.as_instance()
    }

    /// Entries of a repeated composite field, empty when unset
    pub fn children(&self, name: &str) -> &[Instance] {
        match self.get(name) {
            Some(FieldValue::CompositeList(items)) => items,
            _ => &[],
        }
    }

    /// Elements of a repeated primitive field, empty when unset
    pub fn primitives(&self, name: &str) -> &[PrimitiveElement] {
        match self.get(name) {
            Some(FieldValue::PrimitiveList(items)) => items,
            _ => &[],
        }
    }

    /// Member field bound for a choice group such as `value`
    pub fn active_choice(&self, group: &str) -> Option<&str> {
        self.active_choices.get(group).map(String::as_str)
    }

    pub fn choice_value(&self, group: &str) -> Option<(&str, &FieldValue)> {
        let member = self.active_choice(group)?;
        self.get(member).map(|value| (member, value))
    }

    pub fn id(&self) -> Option<&str> {
        self.str_value("id")
    }

    /// Contained resource with the given logical id
    pub fn contained(&self, id: &str) -> Option<&Instance> {
        self.children("contained")
            .iter()
            .find(|resource| resource.id() == Some(id))
    }

    /// Resolve a fragment reference (`#id`) against the contained resources
    pub fn resolve_local_reference(&self, reference: &str) -> Option<&Instance> {
        let id = reference.strip_prefix('#')?;
        if id.is_empty() {
            return None;
        }
        self.contained(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string(value: &str) -> FieldValue {
        FieldValue::Primitive(PrimitiveElement::new(PrimitiveValue::String(value.to_string())))
    }

    fn practitioner(id: &str) -> Instance {
        let mut fields = IndexMap::new();
        fields.insert("id".to_string(), string(id));
        Instance::new("Practitioner", FhirRelease::R4B, true, fields, IndexMap::new())
    }

    #[test]
    fn test_contained_lookup() {
        let mut fields = IndexMap::new();
        fields.insert(
            "contained".to_string(),
            FieldValue::CompositeList(vec![practitioner("p1"), practitioner("p2")]),
        );
        let patient = Instance::new("Patient", FhirRelease::R4B, true, fields, IndexMap::new());

        assert_eq!(patient.contained("p2").and_then(Instance::id), Some("p2"));
        assert!(patient.contained("p3").is_none());
        assert_eq!(
            patient.resolve_local_reference("#p1").map(Instance::type_name),
            Some("Practitioner")
        );
        assert!(patient.resolve_local_reference("p1").is_none());
        assert!(patient.resolve_local_reference("#").is_none());
    }

    #[test]
    fn test_choice_accessors() {
        let mut fields = IndexMap::new();
        fields.insert("valueString".to_string(), string("hello"));
        let mut choices = IndexMap::new();
        choices.insert("value".to_string(), "valueString".to_string());
        let ext = Instance::new("Extension", FhirRelease::R5, false, fields, choices);

        assert_eq!(ext.active_choice("value"), Some("valueString"));
        let (member, value) = ext.choice_value("value").unwrap();
        assert_eq!(member, "valueString");
        assert_eq!(value.len(), 1);
        assert!(ext.active_choice("other").is_none());
        assert!(ext.children("extension").is_empty());
    }
}

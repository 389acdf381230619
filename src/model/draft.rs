use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::types::ExtensionCarrier;

/// Programmatic input for the resolver.
///
/// Field values are given in their JSON form. Sidecars may be supplied already
/// typed; they then take precedence over any raw `_name` entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceDraft {
    pub(crate) type_name: Option<String>,
    pub(crate) values: Map<String, Value>,
    pub(crate) carriers: IndexMap<String, ExtensionCarrier>,
}

impl InstanceDraft {
    /// Draft of a known type, the type name acts as the discriminator
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            ..Self::default()
        }
    }

    /// Draft whose type comes from the slot it is resolved for
    pub fn untyped() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: impl Into<String>, value: Value) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Attach a typed sidecar to the primitive field `name`
    pub fn set_extension(mut self, name: impl Into<String>, carrier: ExtensionCarrier) -> Self {
        self.carriers.insert(name.into(), carrier);
        self
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_draft_builder() {
        let draft = InstanceDraft::new("Patient")
            .set("gender", json!("female"))
            .set_extension("birthDate", ExtensionCarrier::new().with_id("b1"));
        assert_eq!(draft.type_name(), Some("Patient"));
        assert_eq!(draft.value("gender"), Some(&json!("female")));
        assert_eq!(draft.carriers.len(), 1);
        assert!(InstanceDraft::untyped().type_name().is_none());
    }
}

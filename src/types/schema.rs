use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::FieldDescriptor;
use crate::core::FhirRelease;
use crate::error::{FhirResourceError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaKind {
    /// Top-level resource, carries `resourceType` on the wire
    Resource,
    /// Reusable complex data type
    ComplexType,
    /// Inline element owned by a resource or data type
    Backbone,
}

/// Declarative description of one resource or data type variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDescriptor {
    pub type_name: String,
    pub release: FhirRelease,
    pub kind: SchemaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Own fields in wire order, inherited fields come from `base_type`
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl SchemaDescriptor {
    pub fn new(type_name: impl Into<String>, release: FhirRelease, kind: SchemaKind) -> Self {
        Self {
            type_name: type_name.into(),
            release,
            kind,
            base_type: None,
            is_abstract: false,
            fields: Vec::new(),
        }
    }

    pub fn resource(type_name: impl Into<String>, release: FhirRelease) -> Self {
        Self::new(type_name, release, SchemaKind::Resource)
    }

    pub fn complex_type(type_name: impl Into<String>, release: FhirRelease) -> Self {
        Self::new(type_name, release, SchemaKind::ComplexType)
    }

    pub fn backbone(type_name: impl Into<String>, release: FhirRelease) -> Self {
        Self::new(type_name, release, SchemaKind::Backbone)
    }

    pub fn with_base(mut self, base_type: impl Into<String>) -> Self {
        self.base_type = Some(base_type.into());
        self
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn is_resource(&self) -> bool {
        self.kind == SchemaKind::Resource
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Checks that only need this descriptor, the registry checks the rest at seal time
    pub fn validate_structure(&self) -> Result<()> {
        if self.type_name.is_empty() {
            return Err(FhirResourceError::invalid_schema(
                "Schema type name cannot be empty",
            ));
        }

        let mut seen = HashSet::new();
        let mut group_required: HashMap<&str, bool> = HashMap::new();
        for field in &self.fields {
            if field.name.is_empty() || field.name.starts_with('_') {
                return Err(FhirResourceError::invalid_schema(format!(
                    "{}: invalid field name '{}'",
                    self.type_name, field.name
                )));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(FhirResourceError::invalid_schema(format!(
                    "{}: duplicate field name '{}'",
                    self.type_name, field.name
                )));
            }
            if let Some(group) = &field.choice_group {
                if field.is_repeated() {
                    return Err(FhirResourceError::invalid_schema(format!(
                        "{}: choice member '{}' cannot repeat",
                        self.type_name, field.name
                    )));
                }
                match group_required.get(group.as_str()) {
                    Some(&required) if required != field.choice_group_required => {
                        return Err(FhirResourceError::invalid_schema(format!(
                            "{}: members of choice group '{group}' disagree on whether it is required",
                            self.type_name
                        )));
                    }
                    Some(_) => {}
                    None => {
                        group_required.insert(group.as_str(), field.choice_group_required);
                    }
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for SchemaDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.type_name, self.release)?;
        if let Some(base) = &self.base_type {
            write!(f, " : {base}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PrimitiveType;

    #[test]
    fn test_duplicate_alias_is_rejected() {
        let schema = SchemaDescriptor::complex_type("Broken", FhirRelease::R4B)
            .with_field(FieldDescriptor::primitive("text", PrimitiveType::String))
            .with_field(FieldDescriptor::primitive("text", PrimitiveType::Markdown));
        let err = schema.validate_structure().unwrap_err();
        assert!(err.to_string().contains("duplicate field name 'text'"));
    }

    #[test]
    fn test_choice_group_agreement() {
        let schema = SchemaDescriptor::complex_type("Broken", FhirRelease::R5)
            .with_field(
                FieldDescriptor::primitive("valueString", PrimitiveType::String)
                    .in_choice("value", true),
            )
            .with_field(
                FieldDescriptor::primitive("valueBoolean", PrimitiveType::Boolean)
                    .in_choice("value", false),
            );
        assert!(schema.validate_structure().is_err());
    }

    #[test]
    fn test_repeated_choice_member_is_rejected() {
        let schema = SchemaDescriptor::complex_type("Broken", FhirRelease::R5).with_field(
            FieldDescriptor::composite("valueCoding", "Coding")
                .repeated()
                .in_choice("value", false),
        );
        assert!(schema.validate_structure().is_err());
    }

    #[test]
    fn test_display_and_json() {
        let schema = SchemaDescriptor::resource("Patient", FhirRelease::R4B)
            .with_base("DomainResource")
            .with_field(FieldDescriptor::primitive("active", PrimitiveType::Boolean));
        assert_eq!(schema.to_string(), "Patient@R4B : DomainResource");
        assert!(schema.validate_structure().is_ok());

        let json = serde_json::to_string(&schema).unwrap();
        let back: SchemaDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, schema);
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

use super::PrimitiveType;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    #[default]
    Single,
    Repeated,
}

/// Shape of a field's value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FieldKind {
    /// Primitive scalar with an optional `_name` extension sidecar
    Primitive { primitive: PrimitiveType },
    /// Nested element validated against a single declared type
    Composite { type_name: String },
    /// Any specialisation of `base`, optionally restricted to `allowed`
    Polymorphic {
        base: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        allowed: Vec<String>,
    },
}

impl FieldKind {
    /// Type names this kind refers to in the registry
    pub fn referenced_types(&self) -> Vec<&str> {
        match self {
            FieldKind::Primitive { .. } => Vec::new(),
            FieldKind::Composite { type_name } => vec![type_name.as_str()],
            FieldKind::Polymorphic { base, allowed } => std::iter::once(base.as_str())
                .chain(allowed.iter().map(String::as_str))
                .collect(),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Primitive { primitive } => write!(f, "{primitive}"),
            FieldKind::Composite { type_name } => f.write_str(type_name),
            FieldKind::Polymorphic { base, allowed } if allowed.is_empty() => {
                write!(f, "{base}(*)")
            }
            FieldKind::Polymorphic { base, allowed } => {
                write!(f, "{base}({})", allowed.join("|"))
            }
        }
    }
}

/// Declarative description of one element of a type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Wire alias of the element
    pub name: String,
    #[serde(default)]
    pub cardinality: Cardinality,
    #[serde(default)]
    pub required: bool,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice_group: Option<String>,
    #[serde(default)]
    pub choice_group_required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_codes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_targets: Vec<String>,
}

impl FieldDescriptor {
    fn with_kind(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            cardinality: Cardinality::Single,
            required: false,
            kind,
            choice_group: None,
            choice_group_required: false,
            allowed_codes: Vec::new(),
            reference_targets: Vec::new(),
        }
    }

    pub fn primitive(name: impl Into<String>, primitive: PrimitiveType) -> Self {
        Self::with_kind(name, FieldKind::Primitive { primitive })
    }

    pub fn composite(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            FieldKind::Composite {
                type_name: type_name.into(),
            },
        )
    }

    /// Slot accepting any specialisation of `base`
    pub fn polymorphic(name: impl Into<String>, base: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            FieldKind::Polymorphic {
                base: base.into(),
                allowed: Vec::new(),
            },
        )
    }

    /// Slot accepting only the listed types (or their specialisations)
    pub fn polymorphic_of<I, S>(name: impl Into<String>, base: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(
            name,
            FieldKind::Polymorphic {
                base: base.into(),
                allowed: allowed.into_iter().map(Into::into).collect(),
            },
        )
    }

    pub fn repeated(mut self) -> Self {
        self.cardinality = Cardinality::Repeated;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn in_choice(mut self, group: impl Into<String>, group_required: bool) -> Self {
        self.choice_group = Some(group.into());
        self.choice_group_required = group_required;
        self
    }

    pub fn with_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reference_targets = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_repeated(&self) -> bool {
        self.cardinality == Cardinality::Repeated
    }

    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        match &self.kind {
            FieldKind::Primitive { primitive } => Some(*primitive),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        self.primitive_type().is_some()
    }

    /// Wire key of the extension sidecar (`_name`)
    pub fn sidecar_name(&self) -> String {
        format!("_{}", self.name)
    }

    /// Required outside of any choice group
    pub fn is_plain_required(&self) -> bool {
        self.required && self.choice_group.is_none()
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let min = if self.required { 1 } else { 0 };
        let max = if self.is_repeated() { "*" } else { "1" };
        write!(f, "{}: {} {min}..{max}", self.name, self.kind)?;
        if let Some(group) = &self.choice_group {
            write!(f, " <{group}[x]>")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_shapes() {
        let field = FieldDescriptor::primitive("status", PrimitiveType::Code)
            .required()
            .with_codes(["final", "amended"]);
        assert!(field.is_plain_required());
        assert_eq!(field.sidecar_name(), "_status");
        assert_eq!(field.to_string(), "status: code 1..1");

        let choice = FieldDescriptor::composite("valueQuantity", "Quantity").in_choice("value", false);
        assert!(!choice.is_plain_required());
        assert_eq!(choice.to_string(), "valueQuantity: Quantity 0..1 <value[x]>");

        let contained = FieldDescriptor::polymorphic("contained", "Resource").repeated();
        assert_eq!(contained.to_string(), "contained: Resource(*) 0..*");
    }

    #[test]
    fn test_descriptor_serde_shape() {
        let field = FieldDescriptor::polymorphic_of("resource", "Resource", ["Patient", "Group"]);
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["kind"], "polymorphic");
        assert_eq!(json["base"], "Resource");
        assert_eq!(json["allowed"][1], "Group");

        let back: FieldDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(back, field);
    }

    #[test]
    fn test_referenced_types() {
        let field = FieldDescriptor::polymorphic_of("target", "Resource", ["Patient"]);
        assert_eq!(field.kind.referenced_types(), vec!["Resource", "Patient"]);
        let prim = FieldDescriptor::primitive("id", PrimitiveType::Id);
        assert!(prim.kind.referenced_types().is_empty());
    }
}

//! Polymorphic dispatch and model construction.
//!
//! [`ModelResolver`] is the single entry point turning untrusted input into a
//! validated [`Instance`]. It reads the discriminator, looks the type up in the
//! sealed registry of its release, checks it against the slot being filled and
//! then builds the node field by field, recursing into composite and polymorphic
//! children the same way. All violations of one call are reported together.

mod pass;

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::catalog;
use crate::core::{FhirRelease, ModelConfig};
use crate::error::{FhirResourceError, FieldViolation, Result, ValidationErrors, ViolationKind};
use crate::model::{Instance, InstanceDraft};
use crate::serialization::StructuredWriter;
use crate::types::{FieldDescriptor, FieldKind, SchemaRegistry};

use pass::ResolvePass;

/// Anything the resolver accepts
#[derive(Debug, Clone)]
pub enum ModelInput {
    /// Already validated, passed through after re-checking its type
    Instance(Instance),
    /// JSON text
    Text(String),
    /// JSON bytes
    Bytes(Vec<u8>),
    /// Parsed JSON
    Mapping(Value),
    Draft(InstanceDraft),
}

impl From<Instance> for ModelInput {
    fn from(instance: Instance) -> Self {
        ModelInput::Instance(instance)
    }
}

impl From<Value> for ModelInput {
    fn from(value: Value) -> Self {
        ModelInput::Mapping(value)
    }
}

impl From<&str> for ModelInput {
    fn from(text: &str) -> Self {
        ModelInput::Text(text.to_string())
    }
}

impl From<String> for ModelInput {
    fn from(text: String) -> Self {
        ModelInput::Text(text)
    }
}

impl From<Vec<u8>> for ModelInput {
    fn from(bytes: Vec<u8>) -> Self {
        ModelInput::Bytes(bytes)
    }
}

impl From<&[u8]> for ModelInput {
    fn from(bytes: &[u8]) -> Self {
        ModelInput::Bytes(bytes.to_vec())
    }
}

impl From<InstanceDraft> for ModelInput {
    fn from(draft: InstanceDraft) -> Self {
        ModelInput::Draft(draft)
    }
}

/// Declared type of the slot being filled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetType {
    /// Single concrete type, used when the input names none
    Fixed(String),
    /// Specialisations of `base`, limited to `allowed` (and their
    /// specialisations) when non-empty
    Polymorphic { base: String, allowed: Vec<String> },
}

impl TargetType {
    pub fn fixed(type_name: impl Into<String>) -> Self {
        TargetType::Fixed(type_name.into())
    }

    pub fn any_of<I, S>(base: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TargetType::Polymorphic {
            base: base.into(),
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// Any concrete resource type
    pub fn any_resource() -> Self {
        TargetType::Polymorphic {
            base: "Resource".to_string(),
            allowed: Vec::new(),
        }
    }

    pub(crate) fn for_field(field: &FieldDescriptor) -> Option<Self> {
        match &field.kind {
            FieldKind::Primitive { .. } => None,
            FieldKind::Composite { type_name } => Some(TargetType::Fixed(type_name.clone())),
            FieldKind::Polymorphic { base, allowed } => Some(TargetType::Polymorphic {
                base: base.clone(),
                allowed: allowed.clone(),
            }),
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::Fixed(name) => f.write_str(name),
            TargetType::Polymorphic { base, allowed } if allowed.is_empty() => {
                write!(f, "any {base}")
            }
            TargetType::Polymorphic { allowed, .. } => write!(f, "one of {}", allowed.join(", ")),
        }
    }
}

/// Release-scoped resolver over a sealed registry.
///
/// Cheap to clone and safe to share between threads.
#[derive(Debug, Clone)]
pub struct ModelResolver {
    registry: Arc<SchemaRegistry>,
    config: ModelConfig,
}

impl ModelResolver {
    pub fn new(registry: Arc<SchemaRegistry>, config: ModelConfig) -> Result<Self> {
        config.validate()?;
        if !registry.is_sealed() {
            return Err(FhirResourceError::registry_state(format!(
                "the {} registry must be sealed before resolving",
                registry.release()
            )));
        }
        if registry.release() != config.release {
            return Err(FhirResourceError::Config {
                message: format!(
                    "configured release {} does not match the {} registry",
                    config.release,
                    registry.release()
                ),
            });
        }
        Ok(Self { registry, config })
    }

    /// Resolver over the built-in catalog of `release`
    pub fn for_release(release: FhirRelease) -> Result<Self> {
        Self::new(catalog::shared_registry(release)?, ModelConfig::for_release(release))
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn release(&self) -> FhirRelease {
        self.registry.release()
    }

    /// Parse a document of any concrete resource type
    pub fn parse(&self, input: impl Into<ModelInput>) -> Result<Instance> {
        self.resolve_and_validate(input, &TargetType::any_resource(), self.release())
    }

    /// Parse a document expected to be of `type_name` (or one of its specialisations)
    pub fn parse_as(&self, type_name: &str, input: impl Into<ModelInput>) -> Result<Instance> {
        self.resolve_and_validate(input, &TargetType::fixed(type_name), self.release())
    }

    /// Resolve the concrete type of `input` for a slot of type `target` and build it.
    ///
    /// Fails atomically: either every rule passed, or every violation found is
    /// returned in one [`ValidationErrors`].
    pub fn resolve_and_validate(
        &self,
        input: impl Into<ModelInput>,
        target: &TargetType,
        release: FhirRelease,
    ) -> Result<Instance> {
        if release != self.release() {
            return Err(FhirResourceError::unknown_type(target.to_string(), release));
        }

        match input.into() {
            ModelInput::Instance(instance) => self.pass_through(instance, target),
            ModelInput::Text(text) => {
                let value: Value = serde_json::from_str(&text)?;
                ResolvePass::new(&self.registry, &self.config).resolve_root(&value, None, None, target)
            }
            ModelInput::Bytes(bytes) => {
                let value: Value = serde_json::from_slice(&bytes)?;
                ResolvePass::new(&self.registry, &self.config).resolve_root(&value, None, None, target)
            }
            ModelInput::Mapping(value) => {
                ResolvePass::new(&self.registry, &self.config).resolve_root(&value, None, None, target)
            }
            ModelInput::Draft(draft) => {
                let InstanceDraft {
                    type_name,
                    values,
                    carriers,
                } = draft;
                let value = Value::Object(values);
                ResolvePass::new(&self.registry, &self.config).resolve_root(
                    &value,
                    type_name.as_deref(),
                    Some(&carriers),
                    target,
                )
            }
        }
    }

    fn pass_through(&self, instance: Instance, target: &TargetType) -> Result<Instance> {
        // Instances of another release are never coerced
        if instance.release() != self.release() || !self.registry.contains(instance.type_name()) {
            return Err(FhirResourceError::unknown_type(
                instance.type_name(),
                self.release(),
            ));
        }
        if !pass::target_allows(&self.registry, instance.type_name(), target) {
            let violation = FieldViolation::new(
                "",
                ViolationKind::DisallowedTargetType,
                format!(
                    "type '{}' is not allowed here, expected {target}",
                    instance.type_name()
                ),
            );
            return Err(ValidationErrors::new(instance.type_name(), vec![violation]).into());
        }
        tracing::debug!(
            type_name = %instance.type_name(),
            release = %self.release(),
            "passed through validated instance"
        );
        Ok(instance)
    }

    fn writer(&self) -> StructuredWriter<'_> {
        StructuredWriter::new(&self.registry, &self.config.discriminator_key)
    }

    /// Nested JSON form of `instance`, keys in element order
    pub fn to_structured(&self, instance: &Instance) -> Result<Value> {
        self.writer().write(instance)
    }

    pub fn to_json_string(&self, instance: &Instance) -> Result<String> {
        Ok(serde_json::to_string(&self.to_structured(instance)?)?)
    }

    pub fn to_json_string_pretty(&self, instance: &Instance) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_structured(instance)?)?)
    }
}

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, trace};

use super::TargetType;
use crate::core::ModelConfig;
use crate::error::{FhirResourceError, FieldViolation, Result, ValidationErrors, ViolationKind};
use crate::model::{FieldValue, Instance, PrimitiveElement};
use crate::types::primitive::json_type_name;
use crate::types::{
    ExtensionCarrier, FieldDescriptor, FieldKind, PrimitiveType, PrimitiveValue, SchemaLayout,
    SchemaRegistry, has_satisfying_content,
};
use crate::validation::{
    CarrierCandidate, RequiredFieldError, ValidationContext, validate_choice_group,
    validate_required,
};

type Carriers = IndexMap<String, ExtensionCarrier>;

/// Why a node could not be given a concrete type
enum DispatchFailure {
    Unknown(String),
    Violation(ViolationKind, String),
}

/// Whether `type_name` may fill a slot of type `target`
pub(super) fn target_allows(registry: &SchemaRegistry, type_name: &str, target: &TargetType) -> bool {
    match target {
        TargetType::Fixed(name) => registry.is_specialization_of(type_name, name),
        TargetType::Polymorphic { base, allowed } if allowed.is_empty() => {
            registry.is_specialization_of(type_name, base)
        }
        TargetType::Polymorphic { allowed, .. } => allowed
            .iter()
            .any(|candidate| registry.is_specialization_of(type_name, candidate)),
    }
}

/// Type named by a literal reference such as `Patient/123` or
/// `http://server/fhir/Patient/123/_history/2`.
fn referenced_type(reference: &str) -> Option<&str> {
    if reference.starts_with('#') || reference.starts_with("urn:") {
        return None;
    }
    let path = reference.split('?').next()?.trim_end_matches('/');
    let segments: Vec<&str> = path.split('/').collect();
    let end = segments
        .iter()
        .position(|segment| *segment == "_history")
        .unwrap_or(segments.len());
    if end < 2 {
        return None;
    }
    let type_name = segments[end - 2];
    type_name
        .chars()
        .next()
        .filter(char::is_ascii_uppercase)
        .map(|_| type_name)
}

/// One resolve call. Owns the violation collector, borrows everything else.
pub(super) struct ResolvePass<'r> {
    registry: &'r SchemaRegistry,
    config: &'r ModelConfig,
    ctx: ValidationContext,
}

impl<'r> ResolvePass<'r> {
    pub(super) fn new(registry: &'r Arc<SchemaRegistry>, config: &'r ModelConfig) -> Self {
        Self {
            registry,
            config,
            ctx: ValidationContext::new(),
        }
    }

    pub(super) fn resolve_root(
        mut self,
        value: &Value,
        type_hint: Option<&str>,
        carriers: Option<&Carriers>,
        target: &TargetType,
    ) -> Result<Instance> {
        let root_failure = |kind: ViolationKind, message: String| -> FhirResourceError {
            ValidationErrors::new(target.to_string(), vec![FieldViolation::new("", kind, message)])
                .into()
        };

        let Value::Object(map) = value else {
            return Err(root_failure(
                ViolationKind::TypeCoercion,
                format!("expected a JSON object, got {}", json_type_name(value)),
            ));
        };

        let layout = match self.dispatch(map, type_hint, target) {
            Ok(layout) => layout,
            Err(DispatchFailure::Unknown(name)) => {
                debug!(type_name = %name, release = %self.registry.release(), "unknown discriminator");
                return Err(FhirResourceError::unknown_type(name, self.registry.release()));
            }
            Err(DispatchFailure::Violation(kind, message)) => {
                return Err(root_failure(kind, message));
            }
        };

        let instance = self.build_node(&layout, map, carriers, 0);
        debug!(
            type_name = %layout.type_name,
            release = %self.registry.release(),
            violations = self.ctx.violation_count(),
            "resolved document"
        );
        self.ctx.finish(&layout.type_name)?;
        Ok(instance)
    }

    /// Pick the concrete type of a node
    fn dispatch(
        &self,
        map: &Map<String, Value>,
        type_hint: Option<&str>,
        target: &TargetType,
    ) -> std::result::Result<Arc<SchemaLayout>, DispatchFailure> {
        let key = self.config.discriminator_key.as_str();
        let discriminator = match type_hint {
            Some(name) => Some(name),
            None => match map.get(key) {
                None | Some(Value::Null) => None,
                Some(Value::String(name)) => Some(name.as_str()),
                Some(other) => {
                    return Err(DispatchFailure::Violation(
                        ViolationKind::TypeCoercion,
                        format!("'{key}' must be a string, got {}", json_type_name(other)),
                    ));
                }
            },
        };

        let type_name = match (discriminator, target) {
            (Some(name), _) => name,
            (None, TargetType::Fixed(name)) => name.as_str(),
            (None, TargetType::Polymorphic { base, .. }) => {
                return Err(DispatchFailure::Violation(
                    ViolationKind::UnknownDiscriminator,
                    format!("'{key}' is required to select a concrete {base}"),
                ));
            }
        };

        if !self.registry.contains(type_name) {
            return Err(DispatchFailure::Unknown(type_name.to_string()));
        }
        if !target_allows(self.registry, type_name, target) {
            return Err(DispatchFailure::Violation(
                ViolationKind::DisallowedTargetType,
                format!("type '{type_name}' is not allowed here, expected {target}"),
            ));
        }

        let layout = self
            .registry
            .layout(type_name)
            .map_err(|e| DispatchFailure::Violation(ViolationKind::UnknownDiscriminator, e.to_string()))?;
        if layout.is_abstract {
            return Err(DispatchFailure::Violation(
                ViolationKind::DisallowedTargetType,
                format!("abstract type '{type_name}' cannot be instantiated"),
            ));
        }
        Ok(layout)
    }

    fn build_node(
        &mut self,
        layout: &SchemaLayout,
        map: &Map<String, Value>,
        carriers: Option<&Carriers>,
        depth: usize,
    ) -> Instance {
        trace!(type_name = %layout.type_name, path = %self.ctx.current_path, depth, "building node");

        self.check_discriminator_constant(layout, map);
        self.check_unknown_elements(layout, map, carriers);

        let mut fields = IndexMap::new();
        for field in &layout.fields {
            let raw = map.get(&field.name).filter(|v| !v.is_null());
            let value = match &field.kind {
                FieldKind::Primitive { primitive } if field.is_repeated() => {
                    self.primitive_list(field, *primitive, raw, map.get(&field.sidecar_name()))
                }
                FieldKind::Primitive { primitive } => {
                    let candidate = match carriers.and_then(|c| c.get(&field.name)) {
                        Some(typed) => CarrierCandidate::Typed(typed),
                        None => CarrierCandidate::from_raw(map.get(&field.sidecar_name())),
                    };
                    self.primitive_single(field, *primitive, raw, candidate)
                }
                FieldKind::Composite { .. } | FieldKind::Polymorphic { .. } => {
                    self.composite(field, raw, depth)
                }
            };
            if let Some(value) = value {
                fields.insert(field.name.clone(), value);
            }
        }

        let mut active_choices = IndexMap::new();
        for group in &layout.choice_groups {
            let candidates: Vec<(&str, bool)> = layout
                .members(group)
                .map(|member| (member.name.as_str(), is_supplied(member, map, carriers)))
                .collect();
            match validate_choice_group(&group.name, &candidates, group.required) {
                Ok(Some(member)) => {
                    active_choices.insert(group.name.clone(), member.to_string());
                }
                Ok(None) => {}
                Err(violation) => {
                    self.ctx
                        .add_violation_at(&group.element_name(), violation.kind(), violation.to_string());
                }
            }
        }

        Instance::new(
            layout.type_name.clone(),
            self.registry.release(),
            layout.is_resource(),
            fields,
            active_choices,
        )
    }

    fn check_discriminator_constant(&mut self, layout: &SchemaLayout, map: &Map<String, Value>) {
        if !layout.is_resource() {
            return;
        }
        let key = self.config.discriminator_key.as_str();
        match map.get(key) {
            None | Some(Value::Null) => {}
            Some(Value::String(name)) if *name == layout.type_name => {}
            Some(other) => self.ctx.add_violation_at(
                key,
                ViolationKind::TypeCoercion,
                format!("expected '{}', got {other}", layout.type_name),
            ),
        }
    }

    fn check_unknown_elements(
        &mut self,
        layout: &SchemaLayout,
        map: &Map<String, Value>,
        carriers: Option<&Carriers>,
    ) {
        if self.config.reject_unknown_elements {
            let key = self.config.discriminator_key.as_str();
            for name in map.keys() {
                if name == key || layout.field(name).is_some() {
                    continue;
                }
                if let Some(owner) = name.strip_prefix('_')
                    && layout.field(owner).is_some_and(FieldDescriptor::is_primitive)
                {
                    continue;
                }
                self.ctx.add_violation_at(
                    name,
                    ViolationKind::UnknownElement,
                    format!("'{name}' is not an element of {}", layout.type_name),
                );
            }
        }

        // Typed carriers can only attach to single primitives
        for name in carriers.into_iter().flat_map(|c| c.keys()) {
            let attachable = layout
                .field(name)
                .is_some_and(|f| f.is_primitive() && !f.is_repeated());
            if !attachable {
                self.ctx.add_violation_at(
                    &format!("_{name}"),
                    ViolationKind::UnknownElement,
                    format!(
                        "'{name}' is not a single-valued primitive element of {}",
                        layout.type_name
                    ),
                );
            }
        }
    }

    fn coerce_primitive(
        &mut self,
        field: &FieldDescriptor,
        primitive: PrimitiveType,
        segment: &str,
        value: &Value,
    ) -> Option<PrimitiveValue> {
        let coerced = match primitive.coerce(value) {
            Ok(coerced) => coerced,
            Err(reason) => {
                self.ctx.add_violation_at(segment, ViolationKind::TypeCoercion, reason);
                return None;
            }
        };
        if !field.allowed_codes.is_empty()
            && let Some(code) = coerced.as_str()
            && !field.allowed_codes.iter().any(|allowed| allowed == code)
        {
            self.ctx.add_violation_at(
                segment,
                ViolationKind::TypeCoercion,
                format!(
                    "'{code}' is not one of the permitted values: {}",
                    field.allowed_codes.join(", ")
                ),
            );
            return None;
        }
        Some(coerced)
    }

    fn read_carrier(&mut self, segment: &str, candidate: CarrierCandidate<'_>) -> Option<ExtensionCarrier> {
        let carrier = match candidate {
            CarrierCandidate::Absent => return None,
            CarrierCandidate::Typed(carrier) => Ok(carrier.clone()),
            CarrierCandidate::Raw(map) => ExtensionCarrier::from_map(map),
            CarrierCandidate::Other(value) => ExtensionCarrier::coerce(value),
        };
        match carrier {
            Ok(carrier) if carrier.is_empty() => None,
            Ok(carrier) => Some(carrier),
            Err(reason) => {
                self.ctx.add_violation_at(segment, ViolationKind::TypeCoercion, reason);
                None
            }
        }
    }

    fn primitive_single(
        &mut self,
        field: &FieldDescriptor,
        primitive: PrimitiveType,
        raw: Option<&Value>,
        candidate: CarrierCandidate<'_>,
    ) -> Option<FieldValue> {
        let mut element = PrimitiveElement::default();
        match raw {
            Some(Value::Array(_)) => self.ctx.add_violation_at(
                &field.name,
                ViolationKind::TypeCoercion,
                format!("{} expects a single value, got an array", primitive.code()),
            ),
            Some(value) => element.value = self.coerce_primitive(field, primitive, &field.name, value),
            None => {}
        }
        element.extension = self.read_carrier(&field.sidecar_name(), candidate);

        // Sidecar coercion failures were reported by read_carrier
        if field.is_plain_required()
            && let Err(missing @ RequiredFieldError::Missing { .. }) =
                validate_required(&field.name, raw, candidate)
        {
            self.ctx
                .add_violation_at(&field.name, ViolationKind::MissingRequired, missing.to_string());
        }

        (!element.is_empty()).then_some(FieldValue::Primitive(element))
    }

    fn primitive_list(
        &mut self,
        field: &FieldDescriptor,
        primitive: PrimitiveType,
        raw: Option<&Value>,
        sidecar: Option<&Value>,
    ) -> Option<FieldValue> {
        let name = field.name.as_str();
        let sidecar_name = field.sidecar_name();
        let mut malformed = false;

        let values: &[Value] = match raw {
            None => &[],
            Some(Value::Array(items)) => items,
            Some(other) => {
                malformed = true;
                self.ctx.add_violation_at(
                    name,
                    ViolationKind::TypeCoercion,
                    format!("expected an array, got {}", json_type_name(other)),
                );
                &[]
            }
        };
        let carriers: &[Value] = match sidecar {
            None | Some(Value::Null) => &[],
            Some(Value::Array(items)) => items,
            Some(other) => {
                malformed = true;
                self.ctx.add_violation_at(
                    &sidecar_name,
                    ViolationKind::TypeCoercion,
                    format!("expected an array aligned with '{name}', got {}", json_type_name(other)),
                );
                &[]
            }
        };

        let mut elements = Vec::new();
        for index in 0..values.len().max(carriers.len()) {
            let value = values.get(index).filter(|v| !v.is_null());
            let carrier = carriers.get(index).filter(|v| !v.is_null());
            let segment = format!("{name}[{index}]");

            if value.is_none() && carrier.is_none() {
                self.ctx.add_violation_at(
                    &segment,
                    ViolationKind::TypeCoercion,
                    "element has neither a value nor an extension",
                );
                continue;
            }

            let reported = self.ctx.violation_count();
            let element = PrimitiveElement {
                value: value.and_then(|v| self.coerce_primitive(field, primitive, &segment, v)),
                extension: self.read_carrier(
                    &format!("{sidecar_name}[{index}]"),
                    CarrierCandidate::from_raw(carrier),
                ),
            };
            if !element.is_empty() {
                elements.push(element);
            } else if self.ctx.violation_count() == reported {
                // An empty carrier (`{}`) beside a null value still leaves the slot empty
                self.ctx.add_violation_at(
                    &segment,
                    ViolationKind::TypeCoercion,
                    "element has neither a value nor an extension",
                );
            }
        }

        if field.is_plain_required() && !malformed && values.is_empty() && carriers.is_empty() {
            self.ctx.add_violation_at(
                name,
                ViolationKind::MissingRequired,
                format!("field required: '{name}' needs at least one element"),
            );
        }

        (!elements.is_empty()).then_some(FieldValue::PrimitiveList(elements))
    }

    fn composite(&mut self, field: &FieldDescriptor, raw: Option<&Value>, depth: usize) -> Option<FieldValue> {
        let target = TargetType::for_field(field)?;
        let name = field.name.as_str();

        let Some(raw) = raw else {
            if field.is_plain_required() {
                self.ctx.add_violation_at(
                    name,
                    ViolationKind::MissingRequired,
                    format!("field required: '{name}' is missing"),
                );
            }
            return None;
        };

        self.ctx.push_path(name);
        let value = if field.is_repeated() {
            self.composite_list(field, raw, &target, depth)
        } else {
            self.resolve_child(field, raw, &target, depth)
                .map(|child| FieldValue::Composite(Box::new(child)))
        };
        self.ctx.pop_path();
        value
    }

    fn composite_list(
        &mut self,
        field: &FieldDescriptor,
        raw: &Value,
        target: &TargetType,
        depth: usize,
    ) -> Option<FieldValue> {
        let Value::Array(items) = raw else {
            self.ctx.add_violation(
                ViolationKind::TypeCoercion,
                format!("expected an array, got {}", json_type_name(raw)),
            );
            return None;
        };
        if items.is_empty() && field.is_plain_required() {
            self.ctx.add_violation(
                ViolationKind::MissingRequired,
                format!("field required: '{}' needs at least one element", field.name),
            );
        }

        let mut children = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            self.ctx.push_index(index);
            if let Some(child) = self.resolve_child(field, item, target, depth) {
                children.push(child);
            }
            self.ctx.pop_path();
        }
        (!children.is_empty()).then_some(FieldValue::CompositeList(children))
    }

    /// Resolve the child node at the current path
    fn resolve_child(
        &mut self,
        field: &FieldDescriptor,
        raw: &Value,
        target: &TargetType,
        depth: usize,
    ) -> Option<Instance> {
        if depth + 1 > self.config.max_depth {
            self.ctx.add_violation(
                ViolationKind::TypeCoercion,
                format!("nesting exceeds the maximum depth of {}", self.config.max_depth),
            );
            return None;
        }
        let Value::Object(map) = raw else {
            self.ctx.add_violation(
                ViolationKind::TypeCoercion,
                format!("expected an object, got {}", json_type_name(raw)),
            );
            return None;
        };

        let layout = match self.dispatch(map, None, target) {
            Ok(layout) => layout,
            Err(DispatchFailure::Unknown(name)) => {
                self.ctx.add_violation(
                    ViolationKind::UnknownDiscriminator,
                    format!("'{name}' is not a registered type for {}", self.registry.release()),
                );
                return None;
            }
            Err(DispatchFailure::Violation(kind, message)) => {
                self.ctx.add_violation(kind, message);
                return None;
            }
        };

        let child = self.build_node(&layout, map, None, depth + 1);
        if self.config.check_reference_targets && !field.reference_targets.is_empty() {
            self.check_reference_target(&child, &field.reference_targets);
        }
        Some(child)
    }

    fn check_reference_target(&mut self, reference: &Instance, targets: &[String]) {
        let Some(literal) = reference.str_value("reference") else {
            return;
        };
        let Some(type_name) = referenced_type(literal) else {
            return;
        };
        let allowed = targets.iter().any(|target| {
            target == "Resource"
                || target == type_name
                || self.registry.is_specialization_of(type_name, target)
        });
        if !allowed {
            self.ctx.add_violation_at(
                "reference",
                ViolationKind::DisallowedTargetType,
                format!(
                    "reference to '{type_name}' is not allowed here, expected one of {}",
                    targets.join(", ")
                ),
            );
        }
    }
}

/// Presence of a choice member: a value, or a sidecar explaining its absence
fn is_supplied(field: &FieldDescriptor, map: &Map<String, Value>, carriers: Option<&Carriers>) -> bool {
    if map.get(&field.name).is_some_and(|v| !v.is_null()) {
        return true;
    }
    if !field.is_primitive() {
        return false;
    }
    if let Some(typed) = carriers.and_then(|c| c.get(&field.name)) {
        return has_satisfying_content(Some(typed));
    }
    matches!(
        map.get(&field.sidecar_name()),
        Some(Value::Object(sidecar))
            if sidecar.get("extension").and_then(Value::as_array).is_some_and(|e| !e.is_empty())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referenced_type() {
        assert_eq!(referenced_type("Patient/123"), Some("Patient"));
        assert_eq!(
            referenced_type("http://example.org/fhir/Observation/o1/_history/2"),
            Some("Observation")
        );
        assert_eq!(referenced_type("Group/g1?_format=json"), Some("Group"));
        assert_eq!(referenced_type("#contained-1"), None);
        assert_eq!(referenced_type("urn:uuid:c757873d-ec9a-4326-a141-556f43239520"), None);
        assert_eq!(referenced_type("patient/1"), None);
        assert_eq!(referenced_type("Patient"), None);
    }
}

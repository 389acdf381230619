//! Mandatory primitives that may be replaced by an explanatory extension.

use serde_json::{Map, Value};
use std::fmt;

use crate::types::{ExtensionCarrier, has_satisfying_content};

/// Shape of whatever sits in the `_name` sidecar slot
#[derive(Debug, Clone, Copy)]
pub enum CarrierCandidate<'a> {
    Absent,
    /// Untyped JSON object straight from the input
    Raw(&'a Map<String, Value>),
    /// Carrier supplied already typed, e.g. through an `InstanceDraft`
    Typed(&'a ExtensionCarrier),
    /// Anything else, coerced through the carrier's own rules
    Other(&'a Value),
}

impl<'a> CarrierCandidate<'a> {
    /// Classify a raw sidecar slot, `null` counts as absent
    pub fn from_raw(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => CarrierCandidate::Absent,
            Some(Value::Object(map)) => CarrierCandidate::Raw(map),
            Some(other) => CarrierCandidate::Other(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequiredFieldError {
    /// Neither a value nor an extension explaining its absence
    Missing { field: String },
    /// The sidecar could not be read as an extension carrier
    Coercion { field: String, reason: String },
}

impl fmt::Display for RequiredFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredFieldError::Missing { field } => write!(
                f,
                "field required: '{field}' has no value and no extension explaining its absence"
            ),
            RequiredFieldError::Coercion { field, reason } => {
                write!(f, "invalid extension sidecar '_{field}': {reason}")
            }
        }
    }
}

/// Check a required primitive outside any choice group.
///
/// A non-null value always satisfies the field. Without one, the sidecar must
/// hold at least one extension.
pub fn validate_required(
    field: &str,
    value: Option<&Value>,
    carrier: CarrierCandidate<'_>,
) -> Result<(), RequiredFieldError> {
    if value.is_some_and(|v| !v.is_null()) {
        return Ok(());
    }

    let missing = || RequiredFieldError::Missing {
        field: field.to_string(),
    };
    match carrier {
        CarrierCandidate::Absent => Err(missing()),
        CarrierCandidate::Raw(map) => match map.get("extension") {
            Some(Value::Array(items)) if !items.is_empty() => Ok(()),
            _ => Err(missing()),
        },
        CarrierCandidate::Typed(carrier) => {
            if has_satisfying_content(Some(carrier)) {
                Ok(())
            } else {
                Err(missing())
            }
        }
        CarrierCandidate::Other(value) => {
            let carrier =
                ExtensionCarrier::coerce(value).map_err(|reason| RequiredFieldError::Coercion {
                    field: field.to_string(),
                    reason,
                })?;
            if has_satisfying_content(Some(&carrier)) {
                Ok(())
            } else {
                Err(missing())
            }
        }
    }
}

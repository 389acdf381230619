//! Sidecar extension data for primitive elements.
//!
//! In FHIR JSON a primitive element `birthDate` may be accompanied by a sibling
//! `_birthDate` object holding an element id and extensions. The sidecar is how
//! a mandatory primitive can be left without a value as long as an extension
//! explains why (e.g. `data-absent-reason`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::primitive::json_type_name;

/// Out-of-band metadata of a single primitive element.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtensionCarrier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Extension records, kept opaque apart from their `url`
    #[serde(default, rename = "extension", skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<Map<String, Value>>,
}

impl ExtensionCarrier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_extension(mut self, extension: Map<String, Value>) -> Self {
        self.extensions.push(extension);
        self
    }

    /// Convenience for the common `{"url": ..., "valueX": ...}` shape
    pub fn with_url_value(mut self, url: &str, value_key: &str, value: Value) -> Self {
        let mut record = Map::new();
        record.insert("url".to_string(), Value::String(url.to_string()));
        record.insert(value_key.to_string(), value);
        self.extensions.push(record);
        self
    }

    /// Run the carrier's own validators over an arbitrary JSON value.
    pub fn coerce(value: &Value) -> Result<Self, String> {
        match value {
            Value::Object(map) => Self::from_map(map),
            other => Err(format!(
                "extension sidecar must be an object, got {}",
                json_type_name(other)
            )),
        }
    }

    pub fn from_map(map: &Map<String, Value>) -> Result<Self, String> {
        let carrier: ExtensionCarrier =
            serde_json::from_value(Value::Object(map.clone())).map_err(|e| e.to_string())?;
        carrier.check()?;
        Ok(carrier)
    }

    fn check(&self) -> Result<(), String> {
        if let Some(id) = &self.id
            && (id.is_empty() || id.chars().any(char::is_whitespace))
        {
            return Err(format!("invalid element id '{id}'"));
        }
        for (index, record) in self.extensions.iter().enumerate() {
            match record.get("url") {
                Some(Value::String(url)) if !url.is_empty() => {}
                _ => return Err(format!("extension[{index}] is missing its url")),
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.extensions.is_empty()
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        if let Some(id) = &self.id {
            map.insert("id".to_string(), Value::String(id.clone()));
        }
        if !self.extensions.is_empty() {
            map.insert(
                "extension".to_string(),
                Value::Array(self.extensions.iter().cloned().map(Value::Object).collect()),
            );
        }
        Value::Object(map)
    }
}

/// A carrier explains an absent value only when it holds at least one extension;
/// an id alone is not enough.
pub fn has_satisfying_content(carrier: Option<&ExtensionCarrier>) -> bool {
    carrier.is_some_and(|c| !c.extensions.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data_absent() -> ExtensionCarrier {
        ExtensionCarrier::new().with_url_value(
            "http://hl7.org/fhir/StructureDefinition/data-absent-reason",
            "valueCode",
            json!("unknown"),
        )
    }

    #[test]
    fn test_satisfying_content() {
        assert!(!has_satisfying_content(None));
        assert!(!has_satisfying_content(Some(&ExtensionCarrier::new())));
        assert!(!has_satisfying_content(Some(
            &ExtensionCarrier::new().with_id("a1")
        )));
        assert!(has_satisfying_content(Some(&data_absent())));
    }

    #[test]
    fn test_coerce_valid_sidecar() {
        let carrier = ExtensionCarrier::coerce(&json!({
            "id": "s1",
            "extension": [{"url": "http://example.org/ext", "valueString": "x"}]
        }))
        .unwrap();
        assert_eq!(carrier.id.as_deref(), Some("s1"));
        assert_eq!(carrier.extensions.len(), 1);
    }

    #[test]
    fn test_coerce_rejects_bad_shapes() {
        assert!(ExtensionCarrier::coerce(&json!("text")).is_err());
        assert!(ExtensionCarrier::coerce(&json!({"extension": "nope"})).is_err());
        assert!(ExtensionCarrier::coerce(&json!({"unexpected": 1})).is_err());
        assert!(ExtensionCarrier::coerce(&json!({"extension": [{"valueCode": "x"}]})).is_err());
        assert!(ExtensionCarrier::coerce(&json!({"id": "has space"})).is_err());
    }

    #[test]
    fn test_to_json_omits_empty_parts() {
        assert_eq!(ExtensionCarrier::new().with_id("x").to_json(), json!({"id": "x"}));
        let json = data_absent().to_json();
        assert!(json.get("id").is_none());
        assert_eq!(json["extension"][0]["valueCode"], "unknown");
    }
}

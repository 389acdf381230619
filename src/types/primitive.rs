// FHIR primitive data types and their lexical rules

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s]+( [^\s]+)*$").unwrap());
static ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9\-\.]{1,64}$").unwrap());
static URI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S*$").unwrap());
static OID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^urn:oid:[0-2](\.(0|[1-9][0-9]*))+$").unwrap());
static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^urn:uuid:[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});
static INTEGER64_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(0|[-+]?[1-9][0-9]*)$").unwrap());
static BASE64_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*([0-9a-zA-Z\+/=]){4}\s*)+$").unwrap());
static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9]([0-9]([0-9][1-9]|[1-9]0)|[1-9]00)|[1-9]000)(-(0[1-9]|1[0-2])(-(0[1-9]|[1-2][0-9]|3[0-1]))?)?$",
    )
    .unwrap()
});
static DATE_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9]([0-9]([0-9][1-9]|[1-9]0)|[1-9]00)|[1-9]000)(-(0[1-9]|1[0-2])(-(0[1-9]|[1-2][0-9]|3[0-1])(T([01][0-9]|2[0-3]):[0-5][0-9]:([0-5][0-9]|60)(\.[0-9]+)?(Z|(\+|-)((0[0-9]|1[0-3]):[0-5][0-9]|14:00)))?)?)?$",
    )
    .unwrap()
});
static INSTANT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9]([0-9]([0-9][1-9]|[1-9]0)|[1-9]00)|[1-9]000)-(0[1-9]|1[0-2])-(0[1-9]|[1-2][0-9]|3[0-1])T([01][0-9]|2[0-3]):[0-5][0-9]:([0-5][0-9]|60)(\.[0-9]+)?(Z|(\+|-)((0[0-9]|1[0-3]):[0-5][0-9]|14:00))$",
    )
    .unwrap()
});
static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]:([0-5][0-9]|60)(\.[0-9]+)?$").unwrap());

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum PrimitiveType {
    Boolean,
    Integer,
    Integer64,
    PositiveInt,
    UnsignedInt,
    Decimal,
    String,
    Code,
    Id,
    Markdown,
    Uri,
    Url,
    Canonical,
    Oid,
    Uuid,
    Base64Binary,
    Date,
    DateTime,
    Instant,
    Time,
    Xhtml,
}

impl PrimitiveType {
    /// FHIR type code, as used in StructureDefinitions and `value[x]` suffixes
    pub fn code(&self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Integer64 => "integer64",
            PrimitiveType::PositiveInt => "positiveInt",
            PrimitiveType::UnsignedInt => "unsignedInt",
            PrimitiveType::Decimal => "decimal",
            PrimitiveType::String => "string",
            PrimitiveType::Code => "code",
            PrimitiveType::Id => "id",
            PrimitiveType::Markdown => "markdown",
            PrimitiveType::Uri => "uri",
            PrimitiveType::Url => "url",
            PrimitiveType::Canonical => "canonical",
            PrimitiveType::Oid => "oid",
            PrimitiveType::Uuid => "uuid",
            PrimitiveType::Base64Binary => "base64Binary",
            PrimitiveType::Date => "date",
            PrimitiveType::DateTime => "dateTime",
            PrimitiveType::Instant => "instant",
            PrimitiveType::Time => "time",
            PrimitiveType::Xhtml => "xhtml",
        }
    }

    /// Coerce a JSON value into this primitive's native representation.
    ///
    /// The error string is a human-readable reason, the caller attaches the path.
    pub fn coerce(&self, value: &Value) -> Result<PrimitiveValue, String> {
        match self {
            PrimitiveType::Boolean => value
                .as_bool()
                .map(PrimitiveValue::Boolean)
                .ok_or_else(|| self.mismatch("a boolean", value)),
            PrimitiveType::Integer | PrimitiveType::PositiveInt | PrimitiveType::UnsignedInt => {
                let n = value
                    .as_i64()
                    .ok_or_else(|| self.mismatch("an integer", value))?;
                let (min, max) = match self {
                    PrimitiveType::PositiveInt => (1, i64::from(i32::MAX)),
                    PrimitiveType::UnsignedInt => (0, i64::from(i32::MAX)),
                    _ => (i64::from(i32::MIN), i64::from(i32::MAX)),
                };
                if n < min || n > max {
                    return Err(format!(
                        "{n} is out of range for {} ({min}..={max})",
                        self.code()
                    ));
                }
                Ok(PrimitiveValue::Integer(n))
            }
            PrimitiveType::Integer64 => match value {
                // JSON form is a string, numbers are tolerated for convenience
                Value::Number(n) if n.is_i64() => Ok(PrimitiveValue::String(n.to_string())),
                Value::String(s) if INTEGER64_RE.is_match(s) && s.parse::<i64>().is_ok() => {
                    Ok(PrimitiveValue::String(s.clone()))
                }
                _ => Err(self.mismatch("a 64-bit integer", value)),
            },
            PrimitiveType::Decimal => match value {
                Value::Number(n) => Ok(PrimitiveValue::Decimal(n.clone())),
                _ => Err(self.mismatch("a number", value)),
            },
            _ => {
                let s = value
                    .as_str()
                    .ok_or_else(|| self.mismatch("a string", value))?;
                self.check_lexical(s)?;
                Ok(PrimitiveValue::String(s.to_string()))
            }
        }
    }

    fn check_lexical(&self, s: &str) -> Result<(), String> {
        if s.is_empty() {
            return Err(format!("{} values cannot be empty", self.code()));
        }
        let pattern: Option<&Regex> = match self {
            PrimitiveType::Code => Some(&CODE_RE),
            PrimitiveType::Id => Some(&ID_RE),
            PrimitiveType::Uri | PrimitiveType::Url | PrimitiveType::Canonical => Some(&URI_RE),
            PrimitiveType::Oid => Some(&OID_RE),
            PrimitiveType::Uuid => Some(&UUID_RE),
            PrimitiveType::Base64Binary => Some(&BASE64_RE),
            PrimitiveType::Date => Some(&DATE_RE),
            PrimitiveType::DateTime => Some(&DATE_TIME_RE),
            PrimitiveType::Instant => Some(&INSTANT_RE),
            PrimitiveType::Time => Some(&TIME_RE),
            _ => None,
        };
        if let Some(re) = pattern
            && !re.is_match(s)
        {
            return Err(format!("'{s}' is not a valid {}", self.code()));
        }
        if matches!(
            self,
            PrimitiveType::Date | PrimitiveType::DateTime | PrimitiveType::Instant
        ) && s.len() >= 10
            && !is_calendar_date(&s[..10])
        {
            return Err(format!("'{s}' is not a valid calendar date"));
        }
        Ok(())
    }

    fn mismatch(&self, expected: &str, got: &Value) -> String {
        format!(
            "{} expects {expected}, got {}",
            self.code(),
            json_type_name(got)
        )
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

fn is_calendar_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Coerced value of a primitive element.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveValue {
    Boolean(bool),
    Integer(i64),
    Decimal(Number),
    String(String),
}

impl PrimitiveValue {
    pub fn to_json(&self) -> Value {
        match self {
            PrimitiveValue::Boolean(b) => Value::Bool(*b),
            PrimitiveValue::Integer(i) => Value::from(*i),
            PrimitiveValue::Decimal(n) => Value::Number(n.clone()),
            PrimitiveValue::String(s) => Value::String(s.clone()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PrimitiveValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PrimitiveValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PrimitiveValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveValue::Boolean(b) => write!(f, "{b}"),
            PrimitiveValue::Integer(i) => write!(f, "{i}"),
            PrimitiveValue::Decimal(n) => write!(f, "{n}"),
            PrimitiveValue::String(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_boolean_and_integer_coercion() {
        assert_eq!(
            PrimitiveType::Boolean.coerce(&json!(true)),
            Ok(PrimitiveValue::Boolean(true))
        );
        assert!(PrimitiveType::Boolean.coerce(&json!("true")).is_err());

        assert_eq!(
            PrimitiveType::Integer.coerce(&json!(-3)),
            Ok(PrimitiveValue::Integer(-3))
        );
        assert!(PrimitiveType::Integer.coerce(&json!(1.5)).is_err());
        assert!(PrimitiveType::PositiveInt.coerce(&json!(0)).is_err());
        assert!(PrimitiveType::UnsignedInt.coerce(&json!(0)).is_ok());
        assert!(PrimitiveType::Integer.coerce(&json!(4_294_967_296_i64)).is_err());
    }

    #[test]
    fn test_integer64_accepts_string_form() {
        assert_eq!(
            PrimitiveType::Integer64.coerce(&json!("9007199254740993")),
            Ok(PrimitiveValue::String("9007199254740993".to_string()))
        );
        assert!(PrimitiveType::Integer64.coerce(&json!("01")).is_err());
    }

    #[test]
    fn test_decimal_keeps_number() {
        let value = PrimitiveType::Decimal.coerce(&json!(72.5)).unwrap();
        assert_eq!(value.to_json(), json!(72.5));
        assert!(PrimitiveType::Decimal.coerce(&json!("72.5")).is_err());
    }

    #[test]
    fn test_string_like_lexical_rules() {
        assert!(PrimitiveType::Code.coerce(&json!("final")).is_ok());
        assert!(PrimitiveType::Code.coerce(&json!(" final")).is_err());
        assert!(PrimitiveType::Id.coerce(&json!("pat-1.a")).is_ok());
        assert!(PrimitiveType::Id.coerce(&json!("pat_1")).is_err());
        assert!(PrimitiveType::String.coerce(&json!("")).is_err());
        assert!(PrimitiveType::Uri.coerce(&json!("http://loinc.org")).is_ok());
        assert!(PrimitiveType::Uri.coerce(&json!("has space")).is_err());
        assert!(PrimitiveType::Oid.coerce(&json!("urn:oid:1.2.3")).is_ok());
        assert!(
            PrimitiveType::Uuid
                .coerce(&json!("urn:uuid:c757873d-ec9a-4326-a141-556f43239520"))
                .is_ok()
        );
        assert!(PrimitiveType::Base64Binary.coerce(&json!("aGVsbG8=")).is_ok());
        assert!(PrimitiveType::Base64Binary.coerce(&json!("abc")).is_err());
    }

    #[test]
    fn test_temporal_rules() {
        assert!(PrimitiveType::Date.coerce(&json!("1974")).is_ok());
        assert!(PrimitiveType::Date.coerce(&json!("1974-12")).is_ok());
        assert!(PrimitiveType::Date.coerce(&json!("1974-12-25")).is_ok());
        assert!(PrimitiveType::Date.coerce(&json!("1974-02-30")).is_err());
        assert!(PrimitiveType::DateTime.coerce(&json!("2015-02-07T13:28:17-05:00")).is_ok());
        assert!(PrimitiveType::DateTime.coerce(&json!("2015-02-07T13:28:17")).is_err());
        assert!(PrimitiveType::Instant.coerce(&json!("2015-02-07T13:28:17.239+02:00")).is_ok());
        assert!(PrimitiveType::Instant.coerce(&json!("2015-02-07")).is_err());
        assert!(PrimitiveType::Time.coerce(&json!("14:30:00")).is_ok());
        assert!(PrimitiveType::Time.coerce(&json!("25:00:00")).is_err());
    }
}

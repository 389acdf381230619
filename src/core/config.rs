use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{FhirResourceError, Result};

/// FHIR release a registry, instance, or resolve call is bound to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FhirRelease {
    #[serde(rename = "DSTU2")]
    Dstu2,
    #[serde(rename = "STU3")]
    Stu3,
    #[serde(rename = "R4B")]
    R4B,
    #[serde(rename = "R5")]
    R5,
}

impl FhirRelease {
    /// Get all supported releases, oldest first
    pub fn all() -> &'static [FhirRelease] {
        &[
            FhirRelease::Dstu2,
            FhirRelease::Stu3,
            FhirRelease::R4B,
            FhirRelease::R5,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            FhirRelease::Dstu2 => "DSTU2",
            FhirRelease::Stu3 => "STU3",
            FhirRelease::R4B => "R4B",
            FhirRelease::R5 => "R5",
        }
    }

    /// Published version of the release
    pub fn version(&self) -> &'static str {
        match self {
            FhirRelease::Dstu2 => "1.0.2",
            FhirRelease::Stu3 => "3.0.2",
            FhirRelease::R4B => "4.3.0",
            FhirRelease::R5 => "5.0.0",
        }
    }
}

impl fmt::Display for FhirRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FhirRelease {
    type Err = FhirResourceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "DSTU2" | "1.0.2" => Ok(FhirRelease::Dstu2),
            "STU3" | "3.0.2" => Ok(FhirRelease::Stu3),
            "R4B" | "4.3.0" => Ok(FhirRelease::R4B),
            "R5" | "5.0.0" => Ok(FhirRelease::R5),
            _ => Err(FhirResourceError::Config {
                message: format!("unsupported FHIR release: {s}"),
            }),
        }
    }
}

/// Behaviour switches for a [`ModelResolver`](crate::resolver::ModelResolver).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub release: FhirRelease,
    pub discriminator_key: String,
    pub reject_unknown_elements: bool,
    pub check_reference_targets: bool,
    pub max_depth: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            release: FhirRelease::R5,
            discriminator_key: "resourceType".to_string(),
            reject_unknown_elements: true,
            check_reference_targets: true,
            max_depth: 64,
        }
    }
}

impl ModelConfig {
    pub fn for_release(release: FhirRelease) -> Self {
        Self {
            release,
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ModelConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_unknown_elements_allowed(mut self) -> Self {
        self.reject_unknown_elements = false;
        self
    }

    pub fn with_reference_target_checks(mut self, enabled: bool) -> Self {
        self.check_reference_targets = enabled;
        self
    }

    pub fn with_discriminator_key(mut self, key: impl Into<String>) -> Self {
        self.discriminator_key = key.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.discriminator_key.is_empty() {
            return Err(FhirResourceError::Config {
                message: "discriminator key cannot be empty".to_string(),
            });
        }
        if self.max_depth == 0 {
            return Err(FhirResourceError::Config {
                message: "max_depth must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_labels_round_trip() {
        for release in FhirRelease::all() {
            let parsed: FhirRelease = release.label().parse().unwrap();
            assert_eq!(&parsed, release);
            let parsed: FhirRelease = release.version().parse().unwrap();
            assert_eq!(&parsed, release);
        }
        assert!("R4".parse::<FhirRelease>().is_err());
    }

    #[test]
    fn test_release_serde_names() {
        assert_eq!(serde_json::to_string(&FhirRelease::Dstu2).unwrap(), "\"DSTU2\"");
        let r: FhirRelease = serde_json::from_str("\"R4B\"").unwrap();
        assert_eq!(r, FhirRelease::R4B);
    }

    #[test]
    fn test_config_defaults_and_partial_json() {
        let config = ModelConfig::from_json_str(r#"{"release": "STU3"}"#).unwrap();
        assert_eq!(config.release, FhirRelease::Stu3);
        assert_eq!(config.discriminator_key, "resourceType");
        assert!(config.reject_unknown_elements);
        assert_eq!(config.max_depth, 64);
    }

    #[test]
    fn test_config_rejects_zero_depth() {
        let err = ModelConfig::from_json_str(r#"{"max_depth": 0}"#).unwrap_err();
        assert!(matches!(err, FhirResourceError::Config { .. }));
    }
}

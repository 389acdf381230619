use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::FhirRelease;

#[derive(Error, Debug)]
pub enum FhirResourceError {
    #[error("Unknown type '{type_name}' for release {release}")]
    UnknownType {
        type_name: String,
        release: FhirRelease,
    },

    #[error("Registry state error: {message}")]
    RegistryState { message: String },

    #[error("Invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Parsing error: {0}")]
    Parsing(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}

impl FhirResourceError {
    pub fn unknown_type(type_name: impl Into<String>, release: FhirRelease) -> Self {
        Self::UnknownType {
            type_name: type_name.into(),
            release,
        }
    }

    pub fn registry_state(message: impl Into<String>) -> Self {
        Self::RegistryState {
            message: message.into(),
        }
    }

    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            message: message.into(),
        }
    }

    /// Field violations carried by a validation failure, empty for every other variant.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::Validation(errors) => &errors.violations,
            _ => &[],
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Kind of a single field-level violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    MissingRequired,
    #[serde(rename = "multiple-choice-alternatives-present")]
    ChoiceConflict,
    #[serde(rename = "missing-choice-alternative")]
    ChoiceMissing,
    UnknownDiscriminator,
    DisallowedTargetType,
    #[serde(rename = "type-coercion-failure")]
    TypeCoercion,
    UnknownElement,
}

impl ViolationKind {
    pub fn code(&self) -> &'static str {
        match self {
            ViolationKind::MissingRequired => "missing-required",
            ViolationKind::ChoiceConflict => "multiple-choice-alternatives-present",
            ViolationKind::ChoiceMissing => "missing-choice-alternative",
            ViolationKind::UnknownDiscriminator => "unknown-discriminator",
            ViolationKind::DisallowedTargetType => "disallowed-target-type",
            ViolationKind::TypeCoercion => "type-coercion-failure",
            ViolationKind::UnknownElement => "unknown-element",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One violated field, tagged with its path from the document root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub path: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl FieldViolation {
    pub fn new(path: impl Into<String>, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn display_path(&self) -> &str {
        if self.path.is_empty() {
            "<root>"
        } else {
            &self.path
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.display_path(), self.kind, self.message)
    }
}

/// Aggregate failure of one resolve pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    pub type_name: String,
    pub violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn new(type_name: impl Into<String>, violations: Vec<FieldViolation>) -> Self {
        Self {
            type_name: type_name.into(),
            violations,
        }
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn kinds(&self) -> Vec<ViolationKind> {
        self.violations.iter().map(|v| v.kind).collect()
    }

    pub fn at_path(&self, path: &str) -> Vec<&FieldViolation> {
        self.violations.iter().filter(|v| v.path == path).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} validation error(s) for {}",
            self.violations.len(),
            self.type_name
        )?;
        for violation in &self.violations {
            write!(f, "\n  {violation}")?;
        }
        Ok(())
    }
}

pub type Result<T> = std::result::Result<T, FhirResourceError>;

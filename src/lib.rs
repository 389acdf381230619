//! # OctoFHIR FHIR Resources
//!
//! Release-aware FHIR resource models driven by declarative schemas.
//!
//! ## Features
//!
//! - **Schema registry**: one sealed, lock-free registry of type descriptors per release
//! - **Polymorphic dispatch**: `resourceType`-driven resolution into any allowed type
//! - **FHIR rules**: `name[x]` choice groups, required primitives with `_name`
//!   extension fallback, code and reference-target checks
//! - **Aggregate errors**: every violation of a document, each tagged with its path
//! - **Round trip**: output in element order that reads back to an equal instance
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use octofhir_fhir_resources::{FhirRelease, ModelResolver, Result};
//! use serde_json::json;
//!
//! # fn example() -> Result<()> {
//! let resolver = ModelResolver::for_release(FhirRelease::R4B)?;
//! let patient = resolver.parse(json!({
//!     "resourceType": "Patient",
//!     "birthDate": "1974-12-25"
//! }))?;
//! assert_eq!(patient.type_name(), "Patient");
//!
//! let json = resolver.to_json_string(&patient)?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod core;
pub mod error;
pub mod model;
pub mod resolver;
pub mod serialization;
pub mod types;
pub mod validation;

pub use crate::core::{FhirRelease, ModelConfig};
pub use error::Result;
pub use error::{FhirResourceError, FieldViolation, ValidationErrors, ViolationKind};
pub use model::{FieldValue, Instance, InstanceDraft, PrimitiveElement};
pub use resolver::{ModelInput, ModelResolver, TargetType};
pub use serialization::{StructuredWriter, from_structured, to_json_string, to_json_string_pretty, to_structured};
pub use types::*;

pub mod config;

pub use config::{FhirRelease, ModelConfig};

//! Built-in schema catalogs, one per release.
//!
//! Each catalog is populated by an explicit startup routine: every descriptor of
//! the release is registered in order, then the registry is sealed. Nothing is
//! discovered at runtime.

mod common;
mod dstu2;
mod r4b;
mod r5;
mod stu3;

use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::core::FhirRelease;
use crate::error::Result;
use crate::types::{SchemaDescriptor, SchemaRegistry};

static SHARED: [OnceCell<Arc<SchemaRegistry>>; 4] = [
    OnceCell::new(),
    OnceCell::new(),
    OnceCell::new(),
    OnceCell::new(),
];

/// Descriptors of the built-in catalog of `release`, in registration order
pub fn descriptors_for(release: FhirRelease) -> Vec<SchemaDescriptor> {
    match release {
        FhirRelease::Dstu2 => dstu2::descriptors(),
        FhirRelease::Stu3 => stu3::descriptors(),
        FhirRelease::R4B => r4b::descriptors(),
        FhirRelease::R5 => r5::descriptors(),
    }
}

/// Build and seal a fresh registry holding the built-in catalog of `release`
pub fn registry_for(release: FhirRelease) -> Result<Arc<SchemaRegistry>> {
    let registry = SchemaRegistry::new(release);
    registry.register_all(descriptors_for(release))?;
    registry.seal()?;
    Ok(Arc::new(registry))
}

/// Process-wide registry of `release`, built on first use
pub fn shared_registry(release: FhirRelease) -> Result<Arc<SchemaRegistry>> {
    let slot = match release {
        FhirRelease::Dstu2 => &SHARED[0],
        FhirRelease::Stu3 => &SHARED[1],
        FhirRelease::R4B => &SHARED[2],
        FhirRelease::R5 => &SHARED[3],
    };
    slot.get_or_try_init(|| registry_for(release)).cloned()
}

use super::common::{CatalogBuilder, codes, fields, of, prim, reference};
use crate::core::FhirRelease;
use crate::types::{PrimitiveType as P, SchemaDescriptor};

pub(super) fn descriptors() -> Vec<SchemaDescriptor> {
    let mut b = CatalogBuilder::new(FhirRelease::Dstu2);
    super::common::foundation(&mut b);
    super::common::datatypes(&mut b);
    super::common::resources(&mut b);

    b.resource(
        "Flag",
        fields![
            of("identifier", "Identifier").repeated(),
            of("category", "CodeableConcept"),
            codes("status", &["active", "inactive", "entered-in-error"]).required(),
            of("period", "Period"),
            reference(
                "subject",
                &["Patient", "Location", "Group", "Organization", "Practitioner"]
            )
            .required(),
            reference("encounter", &["Encounter"]),
            reference("author", &["Device", "Organization", "Patient", "Practitioner"]),
            of("code", "CodeableConcept").required(),
        ],
    );

    b.resource(
        "Substance",
        fields![
            of("identifier", "Identifier").repeated(),
            of("category", "CodeableConcept").repeated(),
            of("code", "CodeableConcept").required(),
            prim("description", P::String),
            of("instance", "SubstanceInstance").repeated(),
            of("ingredient", "SubstanceIngredient").repeated(),
        ],
    );
    b.backbone(
        "SubstanceInstance",
        fields![
            of("identifier", "Identifier"),
            prim("expiry", P::DateTime),
            of("quantity", "SimpleQuantity"),
        ],
    );
    b.backbone(
        "SubstanceIngredient",
        fields![
            of("quantity", "Ratio"),
            reference("substance", &["Substance"]).required(),
        ],
    );

    b.finish()
}

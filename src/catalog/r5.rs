use super::common::{Alt, CatalogBuilder, choice, codes, fields, of, prim, reference};
use crate::core::FhirRelease;
use crate::types::{PrimitiveType as P, SchemaDescriptor};

pub(super) fn descriptors() -> Vec<SchemaDescriptor> {
    let mut b = CatalogBuilder::new(FhirRelease::R5);
    super::common::foundation(&mut b);
    super::common::datatypes(&mut b);
    super::common::resources(&mut b);

    b.datatype(
        "CodeableReference",
        fields![of("concept", "CodeableConcept"), of("reference", "Reference")],
    );

    b.resource(
        "Substance",
        fields![
            of("identifier", "Identifier").repeated(),
            prim("instance", P::Boolean).required(),
            codes("status", &["active", "inactive", "entered-in-error"]),
            of("category", "CodeableConcept").repeated(),
            of("code", "CodeableReference").required(),
            prim("description", P::Markdown),
            prim("expiry", P::DateTime),
            of("quantity", "Quantity"),
            of("ingredient", "SubstanceIngredient").repeated(),
        ],
    );
    b.backbone(
        "SubstanceIngredient",
        fields![
            of("quantity", "Ratio"),
            choice(
                "substance",
                true,
                &[Alt::Type("CodeableConcept"), Alt::Ref(&["Substance"])],
            ),
        ],
    );

    b.finish()
}

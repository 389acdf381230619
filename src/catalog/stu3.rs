use super::common::{CatalogBuilder, codes, fields, of, prim, reference};
use crate::core::FhirRelease;
use crate::types::{PrimitiveType as P, SchemaDescriptor};

pub(super) fn descriptors() -> Vec<SchemaDescriptor> {
    let mut b = CatalogBuilder::new(FhirRelease::Stu3);
    super::common::foundation(&mut b);
    super::common::datatypes(&mut b);
    super::common::resources(&mut b);

    b.resource(
        "PaymentNotice",
        fields![
            of("identifier", "Identifier").repeated(),
            codes("status", &["active", "cancelled", "draft", "entered-in-error"]),
            reference("request", &["Resource"]),
            reference("response", &["Resource"]),
            prim("statusDate", P::Date),
            prim("created", P::DateTime),
            reference("target", &["Organization"]),
            reference("provider", &["Practitioner"]),
            reference("organization", &["Organization"]),
            of("paymentStatus", "CodeableConcept"),
        ],
    );

    b.finish()
}

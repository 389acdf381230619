use super::common::{Alt, CatalogBuilder, choice, codes, fields, of, prim, reference};
use crate::core::FhirRelease;
use crate::types::{PrimitiveType as P, SchemaDescriptor};

pub(super) fn descriptors() -> Vec<SchemaDescriptor> {
    let mut b = CatalogBuilder::new(FhirRelease::R4B);
    super::common::foundation(&mut b);
    super::common::datatypes(&mut b);
    super::common::resources(&mut b);

    diagnostic_report(&mut b);
    charge_item(&mut b);

    b.resource(
        "Person",
        fields![
            of("identifier", "Identifier").repeated(),
            of("name", "HumanName").repeated(),
            of("telecom", "ContactPoint").repeated(),
            codes("gender", &["male", "female", "other", "unknown"]),
            prim("birthDate", P::Date),
            of("address", "Address").repeated(),
            of("photo", "Attachment"),
            reference("managingOrganization", &["Organization"]),
            prim("active", P::Boolean),
            of("link", "PersonLink").repeated(),
        ],
    );
    b.backbone(
        "PersonLink",
        fields![
            reference("target", &["Patient", "Practitioner", "RelatedPerson", "Person"]).required(),
            codes("assurance", &["level1", "level2", "level3", "level4"]),
        ],
    );

    // Reusable data type built on BackboneElement
    b.push(
        SchemaDescriptor::complex_type("ProductShelfLife", FhirRelease::R4B)
            .with_base("BackboneElement")
            .with_fields(fields![
                of("identifier", "Identifier"),
                of("type", "CodeableConcept").required(),
                of("period", "Quantity").required(),
                of("specialPrecautionsForStorage", "CodeableConcept").repeated(),
            ]),
    );

    b.finish()
}

fn diagnostic_report(b: &mut CatalogBuilder) {
    b.resource(
        "DiagnosticReport",
        fields![
            of("identifier", "Identifier").repeated(),
            reference(
                "basedOn",
                &[
                    "CarePlan",
                    "ImmunizationRecommendation",
                    "MedicationRequest",
                    "NutritionOrder",
                    "ServiceRequest",
                ],
            )
            .repeated(),
            codes(
                "status",
                &[
                    "registered",
                    "partial",
                    "preliminary",
                    "final",
                    "amended",
                    "corrected",
                    "appended",
                    "cancelled",
                    "entered-in-error",
                    "unknown",
                ],
            )
            .required(),
            of("category", "CodeableConcept").repeated(),
            of("code", "CodeableConcept").required(),
            reference("subject", &["Patient", "Group", "Device", "Location"]),
            reference("encounter", &["Encounter"]),
            choice(
                "effective",
                false,
                &[Alt::Prim(P::DateTime), Alt::Type("Period")],
            ),
            prim("issued", P::Instant),
            reference(
                "performer",
                &["Practitioner", "PractitionerRole", "Organization", "CareTeam"],
            )
            .repeated(),
            reference(
                "resultsInterpreter",
                &["Practitioner", "PractitionerRole", "Organization", "CareTeam"],
            )
            .repeated(),
            reference("specimen", &["Specimen"]).repeated(),
            reference("result", &["Observation"]).repeated(),
            reference("imagingStudy", &["ImagingStudy"]).repeated(),
            of("media", "DiagnosticReportMedia").repeated(),
            prim("conclusion", P::String),
            of("conclusionCode", "CodeableConcept").repeated(),
            of("presentedForm", "Attachment").repeated(),
        ],
    );
    b.backbone(
        "DiagnosticReportMedia",
        fields![
            prim("comment", P::String),
            reference("link", &["Media"]).required(),
        ],
    );
}

fn charge_item(b: &mut CatalogBuilder) {
    let actors = [
        "Practitioner",
        "PractitionerRole",
        "Organization",
        "CareTeam",
        "Patient",
        "Device",
        "RelatedPerson",
    ];
    b.resource(
        "ChargeItem",
        fields![
            of("identifier", "Identifier").repeated(),
            prim("definitionUri", P::Uri).repeated(),
            prim("definitionCanonical", P::Canonical).repeated(),
            codes(
                "status",
                &[
                    "planned",
                    "billable",
                    "not-billable",
                    "aborted",
                    "billed",
                    "entered-in-error",
                    "unknown",
                ],
            )
            .required(),
            reference("partOf", &["ChargeItem"]).repeated(),
            of("code", "CodeableConcept").required(),
            reference("subject", &["Patient", "Group"]).required(),
            reference("context", &["Encounter", "EpisodeOfCare"]),
            choice(
                "occurrence",
                false,
                &[Alt::Prim(P::DateTime), Alt::Type("Period")],
            ),
            of("performer", "ChargeItemPerformer").repeated(),
            reference("performingOrganization", &["Organization"]),
            reference("requestingOrganization", &["Organization"]),
            reference("costCenter", &["Organization"]),
            of("quantity", "Quantity"),
            of("bodysite", "CodeableConcept").repeated(),
            prim("factorOverride", P::Decimal),
            of("priceOverride", "Money"),
            prim("overrideReason", P::String),
            reference("enterer", &actors),
            prim("enteredDate", P::DateTime),
            of("reason", "CodeableConcept").repeated(),
            reference(
                "service",
                &[
                    "DiagnosticReport",
                    "ImagingStudy",
                    "Immunization",
                    "MedicationAdministration",
                    "MedicationDispense",
                    "Observation",
                    "Procedure",
                    "SupplyDelivery",
                ],
            )
            .repeated(),
            choice(
                "product",
                false,
                &[
                    Alt::Ref(&["Device", "Medication", "Substance"]),
                    Alt::Type("CodeableConcept"),
                ],
            ),
            reference("account", &["Account"]).repeated(),
            of("note", "Annotation").repeated(),
            reference("supportingInformation", &["Resource"]).repeated(),
        ],
    );
    b.backbone(
        "ChargeItemPerformer",
        fields![
            of("function", "CodeableConcept"),
            reference("actor", &actors).required(),
        ],
    );
}

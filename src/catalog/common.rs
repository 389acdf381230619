//! Builders and content shared by every release.
//!
//! Differences between releases are expressed with [`CatalogBuilder::since`] and
//! [`CatalogBuilder::is`] checks next to the element they affect.

use crate::core::FhirRelease::{self, Dstu2, R4B, R5, Stu3};
use crate::types::{FieldDescriptor, PrimitiveType as P, SchemaDescriptor};

/// Type of one `name[x]` alternative
#[derive(Debug, Clone, Copy)]
pub(super) enum Alt {
    Prim(P),
    Type(&'static str),
    Ref(&'static [&'static str]),
}

impl Alt {
    fn suffix(&self) -> String {
        match self {
            Alt::Prim(primitive) => capitalize(primitive.code()),
            Alt::Type(type_name) => type_name.to_string(),
            Alt::Ref(_) => "Reference".to_string(),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Anything that contributes fields to a descriptor
pub(super) trait IntoFields {
    fn push_into(self, fields: &mut Vec<FieldDescriptor>);
}

impl IntoFields for FieldDescriptor {
    fn push_into(self, fields: &mut Vec<FieldDescriptor>) {
        fields.push(self);
    }
}

impl IntoFields for Vec<FieldDescriptor> {
    fn push_into(self, fields: &mut Vec<FieldDescriptor>) {
        fields.extend(self);
    }
}

impl IntoFields for Option<FieldDescriptor> {
    fn push_into(self, fields: &mut Vec<FieldDescriptor>) {
        fields.extend(self);
    }
}

macro_rules! fields {
    ($($item:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut fields = Vec::new();
        $( $crate::catalog::common::IntoFields::push_into($item, &mut fields); )*
        fields
    }};
}
pub(super) use fields;

pub(super) fn prim(name: &str, primitive: P) -> FieldDescriptor {
    FieldDescriptor::primitive(name, primitive)
}

pub(super) fn codes(name: &str, allowed: &[&str]) -> FieldDescriptor {
    FieldDescriptor::primitive(name, P::Code).with_codes(allowed.iter().copied())
}

pub(super) fn of(name: &str, type_name: &str) -> FieldDescriptor {
    FieldDescriptor::composite(name, type_name)
}

pub(super) fn reference(name: &str, targets: &[&str]) -> FieldDescriptor {
    FieldDescriptor::composite(name, "Reference").with_targets(targets.iter().copied())
}

pub(super) fn choice(group: &str, required: bool, alternatives: &[Alt]) -> Vec<FieldDescriptor> {
    alternatives
        .iter()
        .map(|alt| {
            let name = format!("{group}{}", alt.suffix());
            let field = match alt {
                Alt::Prim(primitive) => prim(&name, *primitive),
                Alt::Type(type_name) => of(&name, type_name),
                Alt::Ref(targets) => reference(&name, targets),
            };
            field.in_choice(group, required)
        })
        .collect()
}

/// Ordered collection of one release's descriptors
pub(super) struct CatalogBuilder {
    release: FhirRelease,
    descriptors: Vec<SchemaDescriptor>,
}

impl CatalogBuilder {
    pub(super) fn new(release: FhirRelease) -> Self {
        Self {
            release,
            descriptors: Vec::new(),
        }
    }

    pub(super) fn since(&self, release: FhirRelease) -> bool {
        self.release >= release
    }

    pub(super) fn is(&self, release: FhirRelease) -> bool {
        self.release == release
    }

    /// `field` only from `release` on
    pub(super) fn from(&self, release: FhirRelease, field: FieldDescriptor) -> Option<FieldDescriptor> {
        self.since(release).then_some(field)
    }

    /// `field` repeats from `release` on, single before
    pub(super) fn repeats_since(&self, release: FhirRelease, field: FieldDescriptor) -> FieldDescriptor {
        if self.since(release) { field.repeated() } else { field }
    }

    fn datatype_base(&self) -> &'static str {
        if self.is(R5) { "DataType" } else { "Element" }
    }

    pub(super) fn push(&mut self, descriptor: SchemaDescriptor) {
        self.descriptors.push(descriptor);
    }

    pub(super) fn datatype(&mut self, name: &str, fields: Vec<FieldDescriptor>) {
        let descriptor = SchemaDescriptor::complex_type(name, self.release)
            .with_base(self.datatype_base())
            .with_fields(fields);
        self.push(descriptor);
    }

    /// Constraint of an existing type that adds no elements (`Age` of `Quantity`)
    pub(super) fn profile(&mut self, name: &str, base: &str) {
        let descriptor = SchemaDescriptor::complex_type(name, self.release).with_base(base);
        self.push(descriptor);
    }

    pub(super) fn backbone(&mut self, name: &str, fields: Vec<FieldDescriptor>) {
        let descriptor = SchemaDescriptor::backbone(name, self.release)
            .with_base("BackboneElement")
            .with_fields(fields);
        self.push(descriptor);
    }

    pub(super) fn resource(&mut self, name: &str, fields: Vec<FieldDescriptor>) {
        self.resource_on("DomainResource", name, fields);
    }

    pub(super) fn resource_on(&mut self, base: &str, name: &str, fields: Vec<FieldDescriptor>) {
        let descriptor = SchemaDescriptor::resource(name, self.release)
            .with_base(base)
            .with_fields(fields);
        self.push(descriptor);
    }

    pub(super) fn finish(self) -> Vec<SchemaDescriptor> {
        self.descriptors
    }
}

pub(super) fn foundation(b: &mut CatalogBuilder) {
    let release = b.release;
    b.push(
        SchemaDescriptor::complex_type("Element", release)
            .with_abstract(true)
            .with_fields(fields![
                prim("id", P::String),
                of("extension", "Extension").repeated(),
            ]),
    );
    b.push(
        SchemaDescriptor::backbone("BackboneElement", release)
            .with_base("Element")
            .with_abstract(true)
            .with_field(of("modifierExtension", "Extension").repeated()),
    );
    if b.is(R5) {
        b.push(
            SchemaDescriptor::complex_type("DataType", release)
                .with_base("Element")
                .with_abstract(true),
        );
        b.push(
            SchemaDescriptor::complex_type("BackboneType", release)
                .with_base("DataType")
                .with_abstract(true)
                .with_field(of("modifierExtension", "Extension").repeated()),
        );
    }
    b.push(
        SchemaDescriptor::resource("Resource", release)
            .with_abstract(true)
            .with_fields(fields![
                prim("id", P::Id),
                of("meta", "Meta"),
                prim("implicitRules", P::Uri),
                prim("language", P::Code),
            ]),
    );
    b.push(
        SchemaDescriptor::resource("DomainResource", release)
            .with_base("Resource")
            .with_abstract(true)
            .with_fields(fields![
                of("text", "Narrative"),
                FieldDescriptor::polymorphic("contained", "Resource").repeated(),
                of("extension", "Extension").repeated(),
                of("modifierExtension", "Extension").repeated(),
            ]),
    );
}

/// Alternatives of `Extension.value[x]` and `Parameters.parameter.value[x]`
pub(super) fn open_value_types(b: &CatalogBuilder) -> Vec<Alt> {
    let mut alts = vec![
        Alt::Prim(P::Base64Binary),
        Alt::Prim(P::Boolean),
    ];
    if b.since(R4B) {
        alts.push(Alt::Prim(P::Canonical));
    }
    alts.extend([
        Alt::Prim(P::Code),
        Alt::Prim(P::Date),
        Alt::Prim(P::DateTime),
        Alt::Prim(P::Decimal),
        Alt::Prim(P::Id),
        Alt::Prim(P::Instant),
        Alt::Prim(P::Integer),
    ]);
    if b.is(R5) {
        alts.push(Alt::Prim(P::Integer64));
    }
    alts.extend([
        Alt::Prim(P::Markdown),
        Alt::Prim(P::Oid),
        Alt::Prim(P::PositiveInt),
        Alt::Prim(P::String),
        Alt::Prim(P::Time),
        Alt::Prim(P::UnsignedInt),
        Alt::Prim(P::Uri),
    ]);
    if b.since(R4B) {
        alts.extend([Alt::Prim(P::Url), Alt::Prim(P::Uuid)]);
    }
    alts.extend([
        Alt::Type("Address"),
        Alt::Type("Age"),
        Alt::Type("Annotation"),
        Alt::Type("Attachment"),
        Alt::Type("CodeableConcept"),
    ]);
    if b.is(R5) {
        alts.push(Alt::Type("CodeableReference"));
    }
    alts.extend([
        Alt::Type("Coding"),
        Alt::Type("ContactPoint"),
        Alt::Type("Count"),
        Alt::Type("Duration"),
        Alt::Type("HumanName"),
        Alt::Type("Identifier"),
    ]);
    if b.since(R4B) {
        alts.push(Alt::Type("Money"));
    }
    alts.extend([
        Alt::Type("Period"),
        Alt::Type("Quantity"),
        Alt::Type("Range"),
        Alt::Type("Ratio"),
    ]);
    if b.since(R4B) {
        alts.push(Alt::Type("RatioRange"));
    }
    alts.push(Alt::Ref(&[]));
    alts
}

pub(super) fn datatypes(b: &mut CatalogBuilder) {
    let value_types = open_value_types(b);
    b.datatype(
        "Extension",
        fields![prim("url", P::Uri).required(), choice("value", false, &value_types)],
    );
    b.datatype(
        "Narrative",
        fields![
            codes("status", &["generated", "extensions", "additional", "empty"]).required(),
            prim("div", P::Xhtml).required(),
        ],
    );
    let profile_type = if b.since(R4B) { P::Canonical } else { P::Uri };
    let meta = fields![
        prim("versionId", P::Id),
        prim("lastUpdated", P::Instant),
        b.from(R4B, prim("source", P::Uri)),
        prim("profile", profile_type).repeated(),
        of("security", "Coding").repeated(),
        of("tag", "Coding").repeated(),
    ];
    b.datatype("Meta", meta);
    b.datatype(
        "Coding",
        fields![
            prim("system", P::Uri),
            prim("version", P::String),
            prim("code", P::Code),
            prim("display", P::String),
            prim("userSelected", P::Boolean),
        ],
    );
    b.datatype(
        "CodeableConcept",
        fields![of("coding", "Coding").repeated(), prim("text", P::String)],
    );

    let identifier_use: &[&str] = if b.since(R4B) {
        &["usual", "official", "temp", "secondary", "old"]
    } else {
        &["usual", "official", "temp", "secondary"]
    };
    b.datatype(
        "Identifier",
        fields![
            codes("use", identifier_use),
            of("type", "CodeableConcept"),
            prim("system", P::Uri),
            prim("value", P::String),
            of("period", "Period"),
            reference("assigner", &["Organization"]),
        ],
    );
    b.datatype(
        "Period",
        fields![prim("start", P::DateTime), prim("end", P::DateTime)],
    );

    let comparators: &[&str] = if b.is(R5) {
        &["<", "<=", ">=", ">", "ad"]
    } else {
        &["<", "<=", ">=", ">"]
    };
    b.datatype(
        "Quantity",
        fields![
            prim("value", P::Decimal),
            codes("comparator", comparators),
            prim("unit", P::String),
            prim("system", P::Uri),
            prim("code", P::Code),
        ],
    );
    for profile in ["Age", "Count", "Duration", "SimpleQuantity"] {
        b.profile(profile, "Quantity");
    }
    b.datatype(
        "Range",
        fields![of("low", "Quantity"), of("high", "Quantity")],
    );
    b.datatype(
        "Ratio",
        fields![of("numerator", "Quantity"), of("denominator", "Quantity")],
    );
    if b.since(R4B) {
        b.datatype(
            "RatioRange",
            fields![
                of("lowNumerator", "Quantity"),
                of("highNumerator", "Quantity"),
                of("denominator", "Quantity"),
            ],
        );
        b.datatype(
            "Money",
            fields![prim("value", P::Decimal), prim("currency", P::Code)],
        );
    }

    let reference_fields = fields![
        prim("reference", P::String),
        b.from(R4B, prim("type", P::Uri)),
        b.from(Stu3, of("identifier", "Identifier")),
        prim("display", P::String),
    ];
    b.datatype("Reference", reference_fields);

    let family = if b.is(Dstu2) {
        prim("family", P::String).repeated()
    } else {
        prim("family", P::String)
    };
    b.datatype(
        "HumanName",
        fields![
            codes(
                "use",
                &["usual", "official", "temp", "nickname", "anonymous", "old", "maiden"]
            ),
            prim("text", P::String),
            family,
            prim("given", P::String).repeated(),
            prim("prefix", P::String).repeated(),
            prim("suffix", P::String).repeated(),
            of("period", "Period"),
        ],
    );

    let contact_systems: &[&str] = if b.is(Dstu2) {
        &["phone", "fax", "email", "pager", "other"]
    } else {
        &["phone", "fax", "email", "pager", "url", "sms", "other"]
    };
    b.datatype(
        "ContactPoint",
        fields![
            codes("system", contact_systems),
            prim("value", P::String),
            codes("use", &["home", "work", "temp", "old", "mobile"]),
            prim("rank", P::PositiveInt),
            of("period", "Period"),
        ],
    );

    let address_use: &[&str] = if b.is(Dstu2) {
        &["home", "work", "temp", "old"]
    } else {
        &["home", "work", "temp", "old", "billing"]
    };
    b.datatype(
        "Address",
        fields![
            codes("use", address_use),
            codes("type", &["postal", "physical", "both"]),
            prim("text", P::String),
            prim("line", P::String).repeated(),
            prim("city", P::String),
            prim("district", P::String),
            prim("state", P::String),
            prim("postalCode", P::String),
            prim("country", P::String),
            of("period", "Period"),
        ],
    );

    let attachment = fields![
        prim("contentType", P::Code),
        prim("language", P::Code),
        prim("data", P::Base64Binary),
        prim("url", if b.since(R4B) { P::Url } else { P::Uri }),
        prim("size", if b.is(R5) { P::Integer64 } else { P::UnsignedInt }),
        prim("hash", P::Base64Binary),
        prim("title", P::String),
        prim("creation", P::DateTime),
        b.from(R5, prim("height", P::PositiveInt)),
        b.from(R5, prim("width", P::PositiveInt)),
        b.from(R5, prim("frames", P::PositiveInt)),
        b.from(R5, prim("duration", P::Decimal)),
        b.from(R5, prim("pages", P::PositiveInt)),
    ];
    b.datatype("Attachment", attachment);

    let annotation = fields![
        choice(
            "author",
            false,
            &[
                Alt::Ref(&["Practitioner", "Patient", "RelatedPerson", "Organization"]),
                Alt::Prim(P::String),
            ],
        ),
        prim("time", P::DateTime),
        prim("text", if b.since(R4B) { P::Markdown } else { P::String }).required(),
    ];
    b.datatype("Annotation", annotation);
}

pub(super) fn resources(b: &mut CatalogBuilder) {
    patient(b);
    group(b);
    observation(b);

    let organization = fields![
        of("identifier", "Identifier").repeated(),
        prim("active", P::Boolean),
        b.repeats_since(Stu3, of("type", "CodeableConcept")),
        prim("name", P::String),
        of("telecom", "ContactPoint").repeated(),
        of("address", "Address").repeated(),
        reference("partOf", &["Organization"]),
    ];
    b.resource("Organization", organization);

    let practitioner = fields![
        of("identifier", "Identifier").repeated(),
        prim("active", P::Boolean),
        b.repeats_since(Stu3, of("name", "HumanName")),
        of("telecom", "ContactPoint").repeated(),
        of("address", "Address").repeated(),
        codes("gender", &["male", "female", "other", "unknown"]),
        prim("birthDate", P::Date),
    ];
    b.resource("Practitioner", practitioner);

    let related_person = fields![
        of("identifier", "Identifier").repeated(),
        b.from(Stu3, prim("active", P::Boolean)),
        reference("patient", &["Patient"]).required(),
        b.repeats_since(R4B, of("relationship", "CodeableConcept")),
        b.repeats_since(Stu3, of("name", "HumanName")),
        of("telecom", "ContactPoint").repeated(),
        codes("gender", &["male", "female", "other", "unknown"]),
        prim("birthDate", P::Date),
    ];
    b.resource("RelatedPerson", related_person);

    let device_status: &[&str] = if b.is(Dstu2) {
        &["available", "not-available", "entered-in-error"]
    } else {
        &["active", "inactive", "entered-in-error", "unknown"]
    };
    b.resource(
        "Device",
        fields![
            of("identifier", "Identifier").repeated(),
            codes("status", device_status),
        ],
    );

    b.resource(
        "Location",
        fields![
            of("identifier", "Identifier").repeated(),
            codes("status", &["active", "suspended", "inactive"]),
            prim("name", P::String),
            prim("description", P::String),
            of("telecom", "ContactPoint").repeated(),
            of("address", "Address"),
            reference("managingOrganization", &["Organization"]),
        ],
    );

    parameters(b);
    bundle(b);
}

fn patient(b: &mut CatalogBuilder) {
    let practitioner_targets: &'static [&'static str] = if b.is(Dstu2) {
        &["Organization", "Practitioner"]
    } else {
        &["Organization", "Practitioner", "PractitionerRole"]
    };
    let general_practitioner = if b.is(Dstu2) { "careProvider" } else { "generalPractitioner" };
    b.resource(
        "Patient",
        fields![
            of("identifier", "Identifier").repeated(),
            prim("active", P::Boolean),
            of("name", "HumanName").repeated(),
            of("telecom", "ContactPoint").repeated(),
            codes("gender", &["male", "female", "other", "unknown"]),
            prim("birthDate", P::Date),
            choice(
                "deceased",
                false,
                &[Alt::Prim(P::Boolean), Alt::Prim(P::DateTime)],
            ),
            of("address", "Address").repeated(),
            of("maritalStatus", "CodeableConcept"),
            choice(
                "multipleBirth",
                false,
                &[Alt::Prim(P::Boolean), Alt::Prim(P::Integer)],
            ),
            of("photo", "Attachment").repeated(),
            reference(general_practitioner, practitioner_targets).repeated(),
            reference("managingOrganization", &["Organization"]),
            of("link", "PatientLink").repeated(),
        ],
    );

    let (other_targets, link_types): (&[&str], &[&str]) = if b.is(Dstu2) {
        (&["Patient"], &["replace", "refer", "seealso"])
    } else {
        (
            &["Patient", "RelatedPerson"],
            &["replaced-by", "replaces", "refer", "seealso"],
        )
    };
    b.backbone(
        "PatientLink",
        fields![
            reference("other", other_targets).required(),
            codes("type", link_types).required(),
        ],
    );
}

fn group(b: &mut CatalogBuilder) {
    let (group_types, membership) = if b.is(R5) {
        (
            &[
                "person",
                "animal",
                "practitioner",
                "device",
                "careteam",
                "healthcareservice",
                "location",
                "organization",
                "relatedperson",
                "specimen",
            ][..],
            codes("membership", &["definitional", "enumerated"]).required(),
        )
    } else {
        (
            &["person", "animal", "practitioner", "device", "medication", "substance"][..],
            prim("actual", P::Boolean).required(),
        )
    };
    let group = fields![
        of("identifier", "Identifier").repeated(),
        b.from(Stu3, prim("active", P::Boolean)),
        codes("type", group_types).required(),
        membership,
        of("code", "CodeableConcept"),
        prim("name", P::String),
        prim("quantity", P::UnsignedInt),
        of("member", "GroupMember").repeated(),
    ];
    b.resource("Group", group);

    let entity_targets: &[&str] = if b.is(R5) {
        &[
            "CareTeam",
            "Device",
            "Group",
            "HealthcareService",
            "Location",
            "Organization",
            "Patient",
            "Practitioner",
            "PractitionerRole",
            "RelatedPerson",
            "Specimen",
        ]
    } else {
        &["Patient", "Practitioner", "Device", "Medication", "Substance"]
    };
    b.backbone(
        "GroupMember",
        fields![
            reference("entity", entity_targets).required(),
            of("period", "Period"),
            prim("inactive", P::Boolean),
        ],
    );
}

fn observation_values(b: &CatalogBuilder) -> Vec<Alt> {
    let mut alts = vec![Alt::Type("Quantity"), Alt::Type("CodeableConcept"), Alt::Prim(P::String)];
    if b.since(Stu3) {
        alts.push(Alt::Prim(P::Boolean));
    }
    if b.since(R4B) {
        alts.push(Alt::Prim(P::Integer));
    }
    alts.extend([Alt::Type("Range"), Alt::Type("Ratio")]);
    if b.is(Dstu2) || b.is(R5) {
        alts.push(Alt::Type("Attachment"));
    }
    alts.extend([
        Alt::Prim(P::Time),
        Alt::Prim(P::DateTime),
        Alt::Type("Period"),
    ]);
    alts
}

fn observation(b: &mut CatalogBuilder) {
    let statuses: &[&str] = if b.is(Dstu2) {
        &["registered", "preliminary", "final", "amended", "cancelled", "entered-in-error", "unknown"]
    } else {
        &[
            "registered",
            "preliminary",
            "final",
            "amended",
            "corrected",
            "cancelled",
            "entered-in-error",
            "unknown",
        ]
    };
    let mut effective = vec![Alt::Prim(P::DateTime), Alt::Type("Period")];
    if b.since(R4B) {
        effective.push(Alt::Prim(P::Instant));
    }
    let values = observation_values(b);

    let observation = fields![
        of("identifier", "Identifier").repeated(),
        codes("status", statuses).required(),
        b.repeats_since(Stu3, of("category", "CodeableConcept")),
        of("code", "CodeableConcept").required(),
        reference("subject", &["Patient", "Group", "Device", "Location"]),
        choice("effective", false, &effective),
        prim("issued", P::Instant),
        choice("value", false, &values),
        of("dataAbsentReason", "CodeableConcept"),
        b.repeats_since(R4B, of("interpretation", "CodeableConcept")),
        of("component", "ObservationComponent").repeated(),
    ];
    b.resource("Observation", observation);

    b.backbone(
        "ObservationComponent",
        fields![
            of("code", "CodeableConcept").required(),
            choice("value", false, &values),
            of("dataAbsentReason", "CodeableConcept"),
        ],
    );
}

fn parameters(b: &mut CatalogBuilder) {
    b.resource_on(
        "Resource",
        "Parameters",
        fields![of("parameter", "ParametersParameter").repeated()],
    );
    let value_types = open_value_types(b);
    b.backbone(
        "ParametersParameter",
        fields![
            prim("name", P::String).required(),
            choice("value", false, &value_types),
            FieldDescriptor::polymorphic("resource", "Resource"),
            of("part", "ParametersParameter").repeated(),
        ],
    );
}

fn bundle(b: &mut CatalogBuilder) {
    let mut bundle_types = vec![
        "document",
        "message",
        "transaction",
        "transaction-response",
        "batch",
        "batch-response",
        "history",
        "searchset",
        "collection",
    ];
    if b.is(R5) {
        bundle_types.push("subscription-notification");
    }
    let bundle = fields![
        b.from(Stu3, of("identifier", "Identifier")),
        codes("type", &bundle_types).required(),
        b.from(R4B, prim("timestamp", P::Instant)),
        prim("total", P::UnsignedInt),
        of("link", "BundleLink").repeated(),
        of("entry", "BundleEntry").repeated(),
    ];
    b.resource_on("Resource", "Bundle", bundle);

    b.backbone(
        "BundleLink",
        fields![
            prim("relation", P::String).required(),
            prim("url", P::Uri).required(),
        ],
    );
    b.backbone(
        "BundleEntry",
        fields![
            of("link", "BundleLink").repeated(),
            prim("fullUrl", P::Uri),
            FieldDescriptor::polymorphic("resource", "Resource"),
        ],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_member_names() {
        let members = choice(
            "value",
            true,
            &[Alt::Prim(P::DateTime), Alt::Type("CodeableConcept"), Alt::Ref(&["Patient"])],
        );
        let names: Vec<&str> = members.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["valueDateTime", "valueCodeableConcept", "valueReference"]);
        assert!(members.iter().all(|f| f.choice_group_required));
        assert_eq!(members[2].reference_targets, vec!["Patient".to_string()]);
    }

    #[test]
    fn test_release_gates() {
        let b = CatalogBuilder::new(R4B);
        assert!(b.since(Stu3));
        assert!(!b.since(R5));
        assert!(b.from(R5, prim("x", P::String)).is_none());
        assert!(b.repeats_since(Stu3, of("name", "HumanName")).is_repeated());

        let dstu2 = CatalogBuilder::new(Dstu2);
        assert!(!dstu2.repeats_since(Stu3, of("name", "HumanName")).is_repeated());
    }
}

pub mod extension;
pub mod field;
pub mod primitive;
pub mod schema;
pub mod schema_registry;

pub use extension::{ExtensionCarrier, has_satisfying_content};
pub use field::{Cardinality, FieldDescriptor, FieldKind};
pub use primitive::{PrimitiveType, PrimitiveValue};
pub use schema::{SchemaDescriptor, SchemaKind};
pub use schema_registry::{ChoiceGroup, SchemaLayout, SchemaRegistry};

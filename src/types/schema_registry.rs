use papaya::HashMap as PapayaMap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::FhirRelease;
use crate::error::{FhirResourceError, Result};
use crate::types::{FieldDescriptor, SchemaDescriptor, SchemaKind};

/// Registry of every type variant of one release, keyed by type name.
///
/// Populated once at startup through [`register`](Self::register), then
/// [`seal`](Self::seal)ed. After sealing the registry never changes, so it can be
/// shared across threads as `Arc<SchemaRegistry>` and read without locks.
#[derive(Debug)]
pub struct SchemaRegistry {
    release: FhirRelease,
    sealed: AtomicBool,
    descriptors: PapayaMap<String, Arc<SchemaDescriptor>>,
    // Flattened base-chain layouts, derived by name lookup on first use
    layouts: PapayaMap<String, Arc<SchemaLayout>>,
}

/// Effective shape of a type: inherited fields first, then its own.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaLayout {
    pub type_name: String,
    pub kind: SchemaKind,
    pub is_abstract: bool,
    pub fields: Vec<FieldDescriptor>,
    pub choice_groups: Vec<ChoiceGroup>,
    index: HashMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceGroup {
    pub name: String,
    /// Positions into [`SchemaLayout::fields`], in wire order
    pub members: Vec<usize>,
    pub required: bool,
}

impl ChoiceGroup {
    /// FHIR notation for the logical element, e.g. `value[x]`
    pub fn element_name(&self) -> String {
        format!("{}[x]", self.name)
    }
}

impl SchemaLayout {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn is_resource(&self) -> bool {
        self.kind == SchemaKind::Resource
    }

    pub fn members<'a>(&'a self, group: &'a ChoiceGroup) -> impl Iterator<Item = &'a FieldDescriptor> {
        group.members.iter().map(move |&i| &self.fields[i])
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    fn build(type_name: &str, chain: &[Arc<SchemaDescriptor>]) -> Result<Self> {
        let leaf = chain
            .last()
            .ok_or_else(|| FhirResourceError::invalid_schema(format!("{type_name}: empty chain")))?;

        let mut fields: Vec<FieldDescriptor> = Vec::new();
        let mut index = HashMap::new();
        for descriptor in chain {
            for field in &descriptor.fields {
                if index.insert(field.name.clone(), fields.len()).is_some() {
                    return Err(FhirResourceError::invalid_schema(format!(
                        "{type_name}: field '{}' from {} reuses an inherited wire name",
                        field.name, descriptor.type_name
                    )));
                }
                fields.push(field.clone());
            }
        }

        let mut choice_groups: Vec<ChoiceGroup> = Vec::new();
        for (position, field) in fields.iter().enumerate() {
            let Some(group_name) = &field.choice_group else {
                continue;
            };
            match choice_groups.iter_mut().find(|g| &g.name == group_name) {
                Some(group) => {
                    if group.required != field.choice_group_required {
                        return Err(FhirResourceError::invalid_schema(format!(
                            "{type_name}: members of choice group '{group_name}' disagree on whether it is required"
                        )));
                    }
                    group.members.push(position);
                }
                None => choice_groups.push(ChoiceGroup {
                    name: group_name.clone(),
                    members: vec![position],
                    required: field.choice_group_required,
                }),
            }
        }

        Ok(Self {
            type_name: type_name.to_string(),
            kind: leaf.kind,
            is_abstract: leaf.is_abstract,
            fields,
            choice_groups,
            index,
        })
    }
}

impl SchemaRegistry {
    pub fn new(release: FhirRelease) -> Self {
        Self {
            release,
            sealed: AtomicBool::new(false),
            descriptors: PapayaMap::new(),
            layouts: PapayaMap::new(),
        }
    }

    pub fn release(&self) -> FhirRelease {
        self.release
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.descriptors.pin().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a descriptor during startup population
    pub fn register(&self, descriptor: SchemaDescriptor) -> Result<()> {
        if self.is_sealed() {
            return Err(FhirResourceError::registry_state(format!(
                "cannot register '{}': the {} registry is sealed",
                descriptor.type_name, self.release
            )));
        }
        if descriptor.release != self.release {
            return Err(FhirResourceError::registry_state(format!(
                "cannot register '{}' for {} into the {} registry",
                descriptor.type_name, descriptor.release, self.release
            )));
        }
        descriptor.validate_structure()?;

        let type_name = descriptor.type_name.clone();
        let guard = self.descriptors.pin();
        if guard.try_insert(type_name.clone(), Arc::new(descriptor)).is_err() {
            return Err(FhirResourceError::registry_state(format!(
                "type '{type_name}' is already registered for {}",
                self.release
            )));
        }
        tracing::trace!(type_name = %type_name, release = %self.release, "registered schema");
        Ok(())
    }

    pub fn register_all(&self, descriptors: impl IntoIterator<Item = SchemaDescriptor>) -> Result<()> {
        for descriptor in descriptors {
            self.register(descriptor)?;
        }
        Ok(())
    }

    /// Register descriptors from a JSON array of [`SchemaDescriptor`]s
    pub fn load_json(&self, json: &str) -> Result<usize> {
        let descriptors: Vec<SchemaDescriptor> = serde_json::from_str(json)?;
        let count = descriptors.len();
        self.register_all(descriptors)?;
        Ok(count)
    }

    /// Verify the whole catalog and freeze it.
    pub fn seal(&self) -> Result<()> {
        if self.is_sealed() {
            return Err(FhirResourceError::registry_state(format!(
                "the {} registry is already sealed",
                self.release
            )));
        }
        self.verify()?;
        self.sealed.store(true, Ordering::Release);
        tracing::info!(
            release = %self.release,
            types = self.len(),
            "sealed schema registry"
        );
        Ok(())
    }

    fn verify(&self) -> Result<()> {
        let guard = self.descriptors.pin();
        for (type_name, descriptor) in guard.iter() {
            if let Some(base) = &descriptor.base_type
                && !guard.contains_key(base)
            {
                return Err(FhirResourceError::invalid_schema(format!(
                    "{type_name}: base type '{base}' is not registered for {}",
                    self.release
                )));
            }
            for field in &descriptor.fields {
                for referenced in field.kind.referenced_types() {
                    if !guard.contains_key(referenced) {
                        return Err(FhirResourceError::invalid_schema(format!(
                            "{type_name}.{}: type '{referenced}' is not registered for {}",
                            field.name, self.release
                        )));
                    }
                }
            }
            // Builds the chain (cycle check) and the flattened layout (alias check)
            self.layout(type_name)?;
        }
        Ok(())
    }

    /// Look up a descriptor by discriminator within a release
    pub fn resolve(&self, type_name: &str, release: FhirRelease) -> Result<Arc<SchemaDescriptor>> {
        if release != self.release {
            return Err(FhirResourceError::unknown_type(type_name, release));
        }
        self.get(type_name)
            .ok_or_else(|| FhirResourceError::unknown_type(type_name, release))
    }

    pub fn get(&self, type_name: &str) -> Option<Arc<SchemaDescriptor>> {
        self.descriptors.pin().get(type_name).cloned()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.descriptors.pin().contains_key(type_name)
    }

    /// Flattened field layout of a type, root ancestor first
    pub fn layout(&self, type_name: &str) -> Result<Arc<SchemaLayout>> {
        if let Some(layout) = self.layouts.pin().get(type_name) {
            return Ok(layout.clone());
        }
        let chain = self.base_chain(type_name)?;
        let layout = Arc::new(SchemaLayout::build(type_name, &chain)?);
        let guard = self.layouts.pin();
        Ok(guard.get_or_insert(type_name.to_string(), layout).clone())
    }

    /// Descriptors from the root ancestor down to `type_name`
    pub fn base_chain(&self, type_name: &str) -> Result<Vec<Arc<SchemaDescriptor>>> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(type_name.to_string());
        while let Some(name) = current {
            if !visited.insert(name.clone()) {
                return Err(FhirResourceError::invalid_schema(format!(
                    "{type_name}: inheritance cycle through '{name}'"
                )));
            }
            let descriptor = self
                .get(&name)
                .ok_or_else(|| FhirResourceError::unknown_type(&name, self.release))?;
            current = descriptor.base_type.clone();
            chain.push(descriptor);
        }
        chain.reverse();
        Ok(chain)
    }

    /// Whether `type_name` is `ancestor` or derives from it
    pub fn is_specialization_of(&self, type_name: &str, ancestor: &str) -> bool {
        let mut current = Some(type_name.to_string());
        let mut steps = 0;
        while let Some(name) = current {
            if name == ancestor {
                return true;
            }
            steps += 1;
            if steps > 64 {
                return false;
            }
            current = self.get(&name).and_then(|d| d.base_type.clone());
        }
        false
    }

    /// All registered type names, sorted
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.descriptors.pin().keys().cloned().collect();
        names.sort();
        names
    }

    /// Concrete resource types, sorted
    pub fn resource_types(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .descriptors
            .pin()
            .iter()
            .filter(|(_, d)| d.is_resource() && !d.is_abstract)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}

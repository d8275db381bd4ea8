//! Concept — the universal named, property-bearing entity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::property::Property;
use super::registry::{BaseAbstraction, ClassRegistry, ClassTag, CONCEPT_CLASS};
use crate::errors::{NoemaError, Result};

/// Identity of a concept instance. Names are not unique; identity is.
pub type ConceptId = Uuid;

/// A named, self-describing node owning a set of properties.
///
/// The property set holds at most one property per distinct property
/// class. Properties are exclusively owned: they are created and
/// destroyed with the concept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Concept {
    id: ConceptId,
    name: String,
    class: ClassTag,
    properties: HashMap<ClassTag, Property>,
}

impl Concept {
    /// Create a concept of the root `Concept` class.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_class(name, ClassTag::new(CONCEPT_CLASS))
    }

    /// Create a concept of a specific concept class.
    pub fn with_class(name: impl Into<String>, class: ClassTag) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            class,
            properties: HashMap::new(),
        }
    }

    /// The concept's identity.
    pub fn id(&self) -> ConceptId {
        self.id
    }

    /// The concept's name. Not validated beyond presence.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the concept.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The concept's class tag.
    pub fn class(&self) -> &ClassTag {
        &self.class
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    /// Add a property.
    ///
    /// The property's class must be a registered property class, and the
    /// concept must not already carry a property of that class.
    pub fn add_property(&mut self, registry: &ClassRegistry, property: Property) -> Result<()> {
        registry.expect_base(property.class(), BaseAbstraction::Property)?;
        if self.properties.contains_key(property.class()) {
            return Err(NoemaError::validation(format!(
                "concept {} already has a property of class {}",
                self.name,
                property.class()
            )));
        }
        self.properties.insert(property.class().clone(), property);
        Ok(())
    }

    /// Add or replace the property of the given class, returning the
    /// previous one if any.
    pub fn set_property(
        &mut self,
        registry: &ClassRegistry,
        property: Property,
    ) -> Result<Option<Property>> {
        registry.expect_base(property.class(), BaseAbstraction::Property)?;
        Ok(self.properties.insert(property.class().clone(), property))
    }

    /// Remove the property of the given class.
    pub fn remove_property(&mut self, class: &ClassTag) -> Result<Property> {
        self.properties.remove(class).ok_or_else(|| {
            NoemaError::validation(format!(
                "concept {} has no property of class {class}",
                self.name
            ))
        })
    }

    /// Remove every property.
    pub fn remove_all_properties(&mut self) {
        self.properties.clear();
    }

    /// The property of the given class, if present.
    pub fn property(&self, class: &ClassTag) -> Option<&Property> {
        self.properties.get(class)
    }

    /// Mutable access to the property of the given class.
    pub fn property_mut(&mut self, class: &ClassTag) -> Option<&mut Property> {
        self.properties.get_mut(class)
    }

    /// True if a property of the given class is present.
    pub fn property_exists(&self, class: &ClassTag) -> bool {
        self.properties.contains_key(class)
    }

    /// Number of properties.
    pub fn number_of_properties(&self) -> usize {
        self.properties.len()
    }

    /// Iterate over all properties. The iterator is finite and
    /// restartable; call again for a fresh pass.
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    /// Iterate over properties with the given name.
    pub fn properties_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Property> + 'a {
        self.properties.values().filter(move |p| p.name() == name)
    }

    /// Iterate over properties whose class conforms to `class`.
    pub fn properties_of_class<'a>(
        &'a self,
        registry: &'a ClassRegistry,
        class: &'a ClassTag,
    ) -> impl Iterator<Item = &'a Property> + 'a {
        self.properties
            .values()
            .filter(move |p| registry.conforms(p.class(), class))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

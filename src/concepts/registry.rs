//! Class tags and the class registry.
//!
//! Strict class checks are implemented as capability tags: every Concept,
//! Property, and Relationship instance carries a [`ClassTag`] that is
//! validated against the registry, rather than a deep inheritance
//! hierarchy. The registry is reflexive at its root: the entry for
//! `"Concept"` is itself of class `"Concept"`, which is how
//! "everything is a Concept" is expressed without circular type
//! definitions.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::errors::{NoemaError, Result};

/// Root class name for concepts.
pub const CONCEPT_CLASS: &str = "Concept";
/// Root class name for properties.
pub const PROPERTY_CLASS: &str = "Property";
/// Root class name for relationships.
pub const RELATIONSHIP_CLASS: &str = "Relationship";

// ---------------------------------------------------------------------------
// ClassTag
// ---------------------------------------------------------------------------

/// The identity of a Concept, Property, or Relationship class.
///
/// Tags are plain names; their meaning lives in the [`ClassRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassTag(String);

impl ClassTag {
    /// Create a tag from a class name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The class name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ClassTag {
    fn from(name: String) -> Self {
        Self(name)
    }
}

// ---------------------------------------------------------------------------
// BaseAbstraction
// ---------------------------------------------------------------------------

/// The base abstraction a class ultimately specializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseAbstraction {
    Concept,
    Property,
    Relationship,
}

impl BaseAbstraction {
    /// The root tag for this abstraction.
    pub fn root_tag(self) -> ClassTag {
        match self {
            BaseAbstraction::Concept => ClassTag::new(CONCEPT_CLASS),
            BaseAbstraction::Property => ClassTag::new(PROPERTY_CLASS),
            BaseAbstraction::Relationship => ClassTag::new(RELATIONSHIP_CLASS),
        }
    }
}

impl fmt::Display for BaseAbstraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BaseAbstraction::Concept => CONCEPT_CLASS,
            BaseAbstraction::Property => PROPERTY_CLASS,
            BaseAbstraction::Relationship => RELATIONSHIP_CLASS,
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// ClassEntry / ClassRegistry
// ---------------------------------------------------------------------------

/// One registered class: its name, the base abstraction it specializes,
/// its optional parent class, and a semantic description. The description
/// is carried verbatim; the registry performs no validation of its
/// semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassEntry {
    pub name: ClassTag,
    pub base: BaseAbstraction,
    pub parent: Option<ClassTag>,
    pub description: String,
}

/// Registry of class tags.
///
/// Shared between ontologies and blackboards; all lookups and
/// registrations are linearizable behind a single lock.
#[derive(Debug)]
pub struct ClassRegistry {
    entries: RwLock<HashMap<ClassTag, ClassEntry>>,
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassRegistry {
    /// Create a registry seeded with the three root entries.
    ///
    /// The `"Concept"` root is reflexive: it has no parent and its own
    /// class is `"Concept"`. `"Property"` and `"Relationship"` descend
    /// from it.
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            ClassTag::new(CONCEPT_CLASS),
            ClassEntry {
                name: ClassTag::new(CONCEPT_CLASS),
                base: BaseAbstraction::Concept,
                parent: None,
                description: "The universal named, property-bearing entity".into(),
            },
        );
        entries.insert(
            ClassTag::new(PROPERTY_CLASS),
            ClassEntry {
                name: ClassTag::new(PROPERTY_CLASS),
                base: BaseAbstraction::Property,
                parent: Some(ClassTag::new(CONCEPT_CLASS)),
                description: "A reified name/value characteristic".into(),
            },
        );
        entries.insert(
            ClassTag::new(RELATIONSHIP_CLASS),
            ClassEntry {
                name: ClassTag::new(RELATIONSHIP_CLASS),
                base: BaseAbstraction::Relationship,
                parent: Some(ClassTag::new(CONCEPT_CLASS)),
                description: "A typed, attributed edge between two concept references".into(),
            },
        );
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Register a class.
    ///
    /// The parent must already be registered, and must either share the
    /// new class's base abstraction or be the `"Concept"` root. A class
    /// registered with no parent descends directly from its base
    /// abstraction's root.
    pub fn register(
        &self,
        name: impl Into<ClassTag>,
        base: BaseAbstraction,
        parent: Option<&ClassTag>,
        description: impl Into<String>,
    ) -> Result<ClassTag> {
        let name = name.into();
        let mut entries = self.entries.write();
        if entries.contains_key(&name) {
            return Err(NoemaError::validation(format!(
                "class {name} is already registered"
            )));
        }
        let parent = match parent {
            Some(tag) => {
                let entry = entries.get(tag).ok_or_else(|| {
                    NoemaError::validation(format!("parent class {tag} is not registered"))
                })?;
                if entry.base != base && entry.name.as_str() != CONCEPT_CLASS {
                    return Err(NoemaError::type_mismatch(
                        base.to_string(),
                        format!("{} (parent {})", entry.base, entry.name),
                    ));
                }
                Some(tag.clone())
            }
            None => Some(base.root_tag()),
        };
        entries.insert(
            name.clone(),
            ClassEntry {
                name: name.clone(),
                base,
                parent,
                description: description.into(),
            },
        );
        Ok(name)
    }

    /// True if the tag is registered.
    pub fn is_registered(&self, tag: &ClassTag) -> bool {
        self.entries.read().contains_key(tag)
    }

    /// Look up a class entry.
    pub fn entry(&self, tag: &ClassTag) -> Option<ClassEntry> {
        self.entries.read().get(tag).cloned()
    }

    /// True if `tag` is `class` or a descendant of it.
    ///
    /// Every registered tag conforms to the `"Concept"` root.
    pub fn conforms(&self, tag: &ClassTag, class: &ClassTag) -> bool {
        let entries = self.entries.read();
        if !entries.contains_key(class) {
            return false;
        }
        let mut current = Some(tag.clone());
        while let Some(tag) = current {
            if tag == *class {
                return true;
            }
            current = match entries.get(&tag) {
                Some(entry) => entry.parent.clone(),
                None => return false,
            };
        }
        false
    }

    /// Check that `tag` is a registered class of the given base
    /// abstraction; raise a type mismatch otherwise.
    pub fn expect_base(&self, tag: &ClassTag, base: BaseAbstraction) -> Result<()> {
        match self.entries.read().get(tag) {
            Some(entry) if entry.base == base => Ok(()),
            Some(entry) => Err(NoemaError::type_mismatch(
                base.to_string(),
                format!("{} (a {} class)", tag, entry.base),
            )),
            None => Err(NoemaError::type_mismatch(
                base.to_string(),
                format!("{tag} (unregistered)"),
            )),
        }
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True if only the seeded roots are present.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Snapshot of all registered tags.
    pub fn tags(&self) -> Vec<ClassTag> {
        self.entries.read().keys().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_seeds_roots() {
        let reg = ClassRegistry::new();
        assert!(reg.is_registered(&ClassTag::new(CONCEPT_CLASS)));
        assert!(reg.is_registered(&ClassTag::new(PROPERTY_CLASS)));
        assert!(reg.is_registered(&ClassTag::new(RELATIONSHIP_CLASS)));
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn test_concept_root_is_reflexive() {
        let reg = ClassRegistry::new();
        let concept = ClassTag::new(CONCEPT_CLASS);
        let entry = reg.entry(&concept).unwrap();
        assert_eq!(entry.base, BaseAbstraction::Concept);
        assert!(entry.parent.is_none());
        assert!(reg.conforms(&concept, &concept));
    }

    #[test]
    fn test_register_and_conform_chain() {
        let reg = ClassRegistry::new();
        let event = reg
            .register("Event", BaseAbstraction::Concept, None, "state change")
            .unwrap();
        let opened = reg
            .register("DoorOpened", BaseAbstraction::Concept, Some(&event), "door event")
            .unwrap();

        assert!(reg.conforms(&opened, &event));
        assert!(reg.conforms(&opened, &ClassTag::new(CONCEPT_CLASS)));
        assert!(!reg.conforms(&event, &opened));
    }

    #[test]
    fn test_register_duplicate_fails() {
        let reg = ClassRegistry::new();
        reg.register("Event", BaseAbstraction::Concept, None, "").unwrap();
        let err = reg
            .register("Event", BaseAbstraction::Concept, None, "")
            .unwrap_err();
        assert!(matches!(err, NoemaError::Validation { .. }));
    }

    #[test]
    fn test_register_unknown_parent_fails() {
        let reg = ClassRegistry::new();
        let ghost = ClassTag::new("Ghost");
        let err = reg
            .register("Event", BaseAbstraction::Concept, Some(&ghost), "")
            .unwrap_err();
        assert!(matches!(err, NoemaError::Validation { .. }));
    }

    #[test]
    fn test_register_cross_base_parent_fails() {
        let reg = ClassRegistry::new();
        let weight = reg
            .register("Weight", BaseAbstraction::Property, None, "")
            .unwrap();
        let err = reg
            .register("Heavier", BaseAbstraction::Relationship, Some(&weight), "")
            .unwrap_err();
        assert!(matches!(err, NoemaError::TypeMismatch { .. }));
    }

    #[test]
    fn test_expect_base() {
        let reg = ClassRegistry::new();
        let weight = reg
            .register("Weight", BaseAbstraction::Property, None, "")
            .unwrap();
        assert!(reg.expect_base(&weight, BaseAbstraction::Property).is_ok());
        let err = reg
            .expect_base(&weight, BaseAbstraction::Relationship)
            .unwrap_err();
        assert!(matches!(err, NoemaError::TypeMismatch { .. }));
        let err = reg
            .expect_base(&ClassTag::new("Ghost"), BaseAbstraction::Concept)
            .unwrap_err();
        assert!(matches!(err, NoemaError::TypeMismatch { .. }));
    }

    #[test]
    fn test_conforms_against_unregistered_class_is_false() {
        let reg = ClassRegistry::new();
        let concept = ClassTag::new(CONCEPT_CLASS);
        assert!(!reg.conforms(&concept, &ClassTag::new("Ghost")));
        assert!(!reg.conforms(&ClassTag::new("Ghost"), &concept));
    }
}

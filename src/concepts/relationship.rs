//! Relationship — a typed, attributed edge between two concept references.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::concept::{Concept, ConceptId};
use super::property::Property;
use super::registry::{BaseAbstraction, ClassRegistry, ClassTag, RELATIONSHIP_CLASS};
use crate::errors::{NoemaError, Result};

/// Identity of a relationship instance.
pub type RelationshipId = Uuid;

/// Selects one of a relationship's two edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Edge1,
    Edge2,
}

/// A non-owning reference from a relationship edge to a concept instance
/// or a concept class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConceptRef {
    /// A specific concept, by identity.
    Instance(ConceptId),
    /// All instances of a class.
    Class(ClassTag),
}

impl ConceptRef {
    /// The referenced instance id, if this is an instance reference.
    pub fn instance_id(&self) -> Option<ConceptId> {
        match self {
            ConceptRef::Instance(id) => Some(*id),
            ConceptRef::Class(_) => None,
        }
    }

    /// True for an instance reference.
    pub fn is_instance(&self) -> bool {
        matches!(self, ConceptRef::Instance(_))
    }
}

impl From<&Concept> for ConceptRef {
    fn from(concept: &Concept) -> Self {
        ConceptRef::Instance(concept.id())
    }
}

/// A typed connection between two concept references.
///
/// Each edge carries its own property set with the same one-per-class
/// invariant as [`Concept`]. Edge references are back-references only;
/// a relationship never owns the concepts it connects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    id: RelationshipId,
    name: String,
    class: ClassTag,
    edge1: ConceptRef,
    edge2: ConceptRef,
    edge1_properties: HashMap<ClassTag, Property>,
    edge2_properties: HashMap<ClassTag, Property>,
}

impl Relationship {
    /// Create a relationship of the root `Relationship` class.
    pub fn new(name: impl Into<String>, edge1: ConceptRef, edge2: ConceptRef) -> Self {
        Self::with_class(name, ClassTag::new(RELATIONSHIP_CLASS), edge1, edge2)
    }

    /// Create a relationship of a specific relationship class.
    pub fn with_class(
        name: impl Into<String>,
        class: ClassTag,
        edge1: ConceptRef,
        edge2: ConceptRef,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            class,
            edge1,
            edge2,
            edge1_properties: HashMap::new(),
            edge2_properties: HashMap::new(),
        }
    }

    /// Convenience constructor linking two concept instances.
    pub fn linking(name: impl Into<String>, edge1: &Concept, edge2: &Concept) -> Self {
        Self::new(name, ConceptRef::from(edge1), ConceptRef::from(edge2))
    }

    /// The relationship's identity.
    pub fn id(&self) -> RelationshipId {
        self.id
    }

    /// The relationship's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the relationship.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The relationship's class tag.
    pub fn class(&self) -> &ClassTag {
        &self.class
    }

    /// The reference held by the given edge.
    pub fn edge(&self, edge: Edge) -> &ConceptRef {
        match edge {
            Edge::Edge1 => &self.edge1,
            Edge::Edge2 => &self.edge2,
        }
    }

    /// Rebind the given edge.
    pub fn set_edge(&mut self, edge: Edge, target: ConceptRef) {
        match edge {
            Edge::Edge1 => self.edge1 = target,
            Edge::Edge2 => self.edge2 = target,
        }
    }

    /// Instance ids referenced by either edge (0, 1, or 2 entries).
    pub fn instance_edges(&self) -> impl Iterator<Item = ConceptId> + '_ {
        [&self.edge1, &self.edge2]
            .into_iter()
            .filter_map(ConceptRef::instance_id)
    }

    /// True if either edge references the given concept instance.
    pub fn references(&self, id: ConceptId) -> bool {
        self.edge1.instance_id() == Some(id) || self.edge2.instance_id() == Some(id)
    }

    // -----------------------------------------------------------------------
    // Edge properties
    // -----------------------------------------------------------------------

    fn props(&self, edge: Edge) -> &HashMap<ClassTag, Property> {
        match edge {
            Edge::Edge1 => &self.edge1_properties,
            Edge::Edge2 => &self.edge2_properties,
        }
    }

    fn props_mut(&mut self, edge: Edge) -> &mut HashMap<ClassTag, Property> {
        match edge {
            Edge::Edge1 => &mut self.edge1_properties,
            Edge::Edge2 => &mut self.edge2_properties,
        }
    }

    /// Add a property to the given edge. Same strict class check and
    /// one-per-class invariant as [`Concept::add_property`].
    pub fn add_edge_property(
        &mut self,
        registry: &ClassRegistry,
        edge: Edge,
        property: Property,
    ) -> Result<()> {
        registry.expect_base(property.class(), BaseAbstraction::Property)?;
        let props = self.props_mut(edge);
        if props.contains_key(property.class()) {
            return Err(NoemaError::validation(format!(
                "edge of {} already has a property of class {}",
                self.name,
                property.class()
            )));
        }
        props.insert(property.class().clone(), property);
        Ok(())
    }

    /// Remove the property of the given class from the given edge.
    pub fn remove_edge_property(&mut self, edge: Edge, class: &ClassTag) -> Result<Property> {
        let name = self.name.clone();
        self.props_mut(edge).remove(class).ok_or_else(|| {
            NoemaError::validation(format!("edge of {name} has no property of class {class}"))
        })
    }

    /// Remove every property from the given edge.
    pub fn remove_all_edge_properties(&mut self, edge: Edge) {
        self.props_mut(edge).clear();
    }

    /// True if the given edge carries a property of the given class.
    pub fn edge_property_exists(&self, edge: Edge, class: &ClassTag) -> bool {
        self.props(edge).contains_key(class)
    }

    /// Number of properties on the given edge.
    pub fn number_of_edge_properties(&self, edge: Edge) -> usize {
        self.props(edge).len()
    }

    /// Iterate over the given edge's properties.
    pub fn edge_properties(&self, edge: Edge) -> impl Iterator<Item = &Property> {
        self.props(edge).values()
    }

    /// Iterate over the given edge's properties with the given name.
    pub fn edge_properties_named<'a>(
        &'a self,
        edge: Edge,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Property> + 'a {
        self.props(edge).values().filter(move |p| p.name() == name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_relationship_edges() {
        let door = Concept::new("Door");
        let room = Concept::new("Room");
        let rel = Relationship::linking("PartOf", &door, &room);

        assert_eq!(rel.edge(Edge::Edge1).instance_id(), Some(door.id()));
        assert_eq!(rel.edge(Edge::Edge2).instance_id(), Some(room.id()));
        assert!(rel.references(door.id()));
        assert!(rel.references(room.id()));
        assert_eq!(rel.instance_edges().count(), 2);
    }

    #[test]
    fn test_class_edge_is_not_an_instance() {
        let door = Concept::new("Door");
        let rel = Relationship::new(
            "IsA",
            ConceptRef::from(&door),
            ConceptRef::Class(ClassTag::new("Portal")),
        );
        assert!(!rel.edge(Edge::Edge2).is_instance());
        assert_eq!(rel.instance_edges().count(), 1);
    }

    #[test]
    fn test_rebind_edge() {
        let door = Concept::new("Door");
        let room = Concept::new("Room");
        let hall = Concept::new("Hall");
        let mut rel = Relationship::linking("PartOf", &door, &room);

        rel.set_edge(Edge::Edge2, ConceptRef::from(&hall));
        assert_eq!(rel.edge(Edge::Edge2).instance_id(), Some(hall.id()));
    }

    #[test]
    fn test_edge_properties_are_per_edge() {
        let reg = ClassRegistry::new();
        let weight = reg
            .register("Weight", BaseAbstraction::Property, None, "")
            .unwrap();

        let door = Concept::new("Door");
        let room = Concept::new("Room");
        let mut rel = Relationship::linking("PartOf", &door, &room);

        rel.add_edge_property(
            &reg,
            Edge::Edge1,
            Property::with_class(weight.clone(), "w", json!(1)),
        )
        .unwrap();

        assert!(rel.edge_property_exists(Edge::Edge1, &weight));
        assert!(!rel.edge_property_exists(Edge::Edge2, &weight));
        assert_eq!(rel.number_of_edge_properties(Edge::Edge1), 1);
        assert_eq!(rel.number_of_edge_properties(Edge::Edge2), 0);

        let err = rel
            .add_edge_property(
                &reg,
                Edge::Edge1,
                Property::with_class(weight.clone(), "w2", json!(2)),
            )
            .unwrap_err();
        assert!(matches!(err, NoemaError::Validation { .. }));

        rel.remove_edge_property(Edge::Edge1, &weight).unwrap();
        assert_eq!(rel.number_of_edge_properties(Edge::Edge1), 0);
    }

    #[test]
    fn test_edge_property_type_check() {
        let reg = ClassRegistry::new();
        let event = reg
            .register("Event", BaseAbstraction::Concept, None, "")
            .unwrap();
        let door = Concept::new("Door");
        let room = Concept::new("Room");
        let mut rel = Relationship::linking("PartOf", &door, &room);

        let err = rel
            .add_edge_property(&reg, Edge::Edge1, Property::with_class(event, "x", json!(0)))
            .unwrap_err();
        assert!(matches!(err, NoemaError::TypeMismatch { .. }));
    }
}

//! The core data model: class tags, properties, concepts, and
//! relationships.
//!
//! Everything here is a plain owned value; shared-mutable semantics live
//! in the collections that hold them ([`crate::ontology`],
//! [`crate::blackboard`]).

pub mod concept;
pub mod property;
pub mod registry;
pub mod relationship;

pub use concept::{Concept, ConceptId};
pub use property::Property;
pub use registry::{
    BaseAbstraction, ClassEntry, ClassRegistry, ClassTag, CONCEPT_CLASS, PROPERTY_CLASS,
    RELATIONSHIP_CLASS,
};
pub use relationship::{ConceptRef, Edge, Relationship, RelationshipId};

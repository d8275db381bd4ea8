//! Ontology — a closed, complete collection of concepts and
//! relationships.
//!
//! Two invariants hold after every operation: *closure* (a relationship's
//! edges only reference concepts present in the ontology, or registered
//! classes) and *completeness* (no relationship has an unresolved edge).
//! Every mutating operation either fully succeeds or leaves the ontology
//! exactly as it was; all state lives behind a single lock, so each
//! operation is linearizable.
//!
//! Iteration is snapshot-at-start: iterator methods clone the matching
//! entries under a read lock and yield from the snapshot. A concurrent
//! mutation never corrupts an in-progress iteration and is never
//! reflected in one.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::concepts::{
    BaseAbstraction, ClassRegistry, ClassTag, Concept, ConceptId, ConceptRef, Edge, Relationship,
    RelationshipId,
};
use crate::errors::{NoemaError, Result};

#[derive(Debug, Default)]
struct OntologyState {
    concepts: HashMap<ConceptId, Concept>,
    relationships: HashMap<RelationshipId, Relationship>,
    /// Concept id -> relationships binding it. Entries are removed when
    /// the set drains, so `bindings.len()` is the bound-concept count.
    bindings: HashMap<ConceptId, HashSet<RelationshipId>>,
}

impl OntologyState {
    fn resolve(&self, registry: &ClassRegistry, edge: &ConceptRef) -> bool {
        match edge {
            ConceptRef::Instance(id) => self.concepts.contains_key(id),
            ConceptRef::Class(tag) => registry.is_registered(tag),
        }
    }

    fn unbind(&mut self, concept: ConceptId, relationship: RelationshipId) {
        if let Some(set) = self.bindings.get_mut(&concept) {
            set.remove(&relationship);
            if set.is_empty() {
                self.bindings.remove(&concept);
            }
        }
    }
}

/// A shared, concurrently mutable collection of concepts and
/// relationships.
#[derive(Debug)]
pub struct Ontology {
    id: ConceptId,
    name: String,
    registry: Arc<ClassRegistry>,
    state: RwLock<OntologyState>,
}

impl Ontology {
    /// Create an empty ontology using the given class registry for
    /// strict class checks and class-edge resolution.
    pub fn new(name: impl Into<String>, registry: Arc<ClassRegistry>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            registry,
            state: RwLock::new(OntologyState::default()),
        }
    }

    /// The ontology's identity.
    pub fn id(&self) -> ConceptId {
        self.id
    }

    /// The ontology's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The class registry this ontology validates against.
    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }

    // -----------------------------------------------------------------------
    // Concepts
    // -----------------------------------------------------------------------

    /// Add a concept. Fails if its class is not a registered concept
    /// class or if the concept is already present.
    pub fn add_concept(&self, concept: Concept) -> Result<ConceptId> {
        self.registry
            .expect_base(concept.class(), BaseAbstraction::Concept)?;
        let mut state = self.state.write();
        let id = concept.id();
        if state.concepts.contains_key(&id) {
            return Err(NoemaError::validation(format!(
                "concept {} already exists in ontology {}",
                concept.name(),
                self.name
            )));
        }
        debug!("ontology {}: add concept {} ({id})", self.name, concept.name());
        state.concepts.insert(id, concept);
        Ok(id)
    }

    /// Remove a concept.
    ///
    /// Without `cascade`, removal of a bound concept fails with a
    /// referential-integrity error and the ontology is unchanged. With
    /// `cascade`, every relationship binding the concept is removed in
    /// the same critical section as the concept itself; no intermediate
    /// state is observable.
    pub fn remove_concept(&self, id: ConceptId, cascade: bool) -> Result<Concept> {
        let mut state = self.state.write();
        if !state.concepts.contains_key(&id) {
            return Err(NoemaError::validation(format!(
                "concept {id} does not exist in ontology {}",
                self.name
            )));
        }
        if let Some(bound) = state.bindings.get(&id) {
            if !cascade {
                return Err(NoemaError::referential(format!(
                    "concept {id} is bound by {} relationship(s) in ontology {}",
                    bound.len(),
                    self.name
                )));
            }
            let referencing: Vec<RelationshipId> = bound.iter().copied().collect();
            for rel_id in referencing {
                if let Some(rel) = state.relationships.remove(&rel_id) {
                    for endpoint in rel.instance_edges() {
                        state.unbind(endpoint, rel_id);
                    }
                }
            }
        }
        debug!("ontology {}: remove concept {id} (cascade={cascade})", self.name);
        state.concepts.remove(&id).ok_or_else(|| {
            NoemaError::validation(format!(
                "concept {id} does not exist in ontology {}",
                self.name
            ))
        })
    }

    /// Remove every concept and, first, every relationship.
    pub fn remove_all_concepts(&self) {
        let mut state = self.state.write();
        state.relationships.clear();
        state.bindings.clear();
        state.concepts.clear();
    }

    /// True if the concept is part of the ontology.
    pub fn concept_exists(&self, id: ConceptId) -> bool {
        self.state.read().concepts.contains_key(&id)
    }

    /// Number of concepts.
    pub fn number_of_concepts(&self) -> usize {
        self.state.read().concepts.len()
    }

    /// A clone of the stored concept, if present.
    pub fn concept(&self, id: ConceptId) -> Option<Concept> {
        self.state.read().concepts.get(&id).cloned()
    }

    /// Run a closure against the stored concept.
    pub fn with_concept<R>(&self, id: ConceptId, f: impl FnOnce(&Concept) -> R) -> Result<R> {
        let state = self.state.read();
        let concept = state.concepts.get(&id).ok_or_else(|| {
            NoemaError::validation(format!("concept {id} does not exist in ontology {}", self.name))
        })?;
        Ok(f(concept))
    }

    /// Run a closure against the stored concept with mutable access,
    /// e.g. to adjust its properties in place.
    pub fn with_concept_mut<R>(
        &self,
        id: ConceptId,
        f: impl FnOnce(&mut Concept) -> R,
    ) -> Result<R> {
        let mut state = self.state.write();
        let concept = state.concepts.get_mut(&id).ok_or_else(|| {
            NoemaError::validation(format!("concept {id} does not exist in ontology {}", self.name))
        })?;
        Ok(f(concept))
    }

    /// Snapshot iteration over all concepts.
    pub fn concepts(&self) -> impl Iterator<Item = Concept> {
        let snapshot: Vec<Concept> = self.state.read().concepts.values().cloned().collect();
        snapshot.into_iter()
    }

    /// Snapshot iteration over concepts with the given name.
    pub fn concepts_named(&self, name: &str) -> impl Iterator<Item = Concept> {
        let snapshot: Vec<Concept> = self
            .state
            .read()
            .concepts
            .values()
            .filter(|c| c.name() == name)
            .cloned()
            .collect();
        snapshot.into_iter()
    }

    /// Snapshot iteration over concepts whose class conforms to `class`.
    pub fn concepts_of_class(&self, class: &ClassTag) -> impl Iterator<Item = Concept> {
        let snapshot: Vec<Concept> = self
            .state
            .read()
            .concepts
            .values()
            .filter(|c| self.registry.conforms(c.class(), class))
            .cloned()
            .collect();
        snapshot.into_iter()
    }

    // -----------------------------------------------------------------------
    // Relationships
    // -----------------------------------------------------------------------

    /// Add a relationship.
    ///
    /// Fails with a validation error unless both edges resolve within
    /// the ontology: an instance edge must reference a concept already
    /// present, a class edge must reference a registered class. On
    /// success both instance endpoints become bound.
    pub fn add_relationship(&self, relationship: Relationship) -> Result<RelationshipId> {
        self.registry
            .expect_base(relationship.class(), BaseAbstraction::Relationship)?;
        let mut state = self.state.write();
        let id = relationship.id();
        if state.relationships.contains_key(&id) {
            return Err(NoemaError::validation(format!(
                "relationship {} already exists in ontology {}",
                relationship.name(),
                self.name
            )));
        }
        for edge in [relationship.edge(Edge::Edge1), relationship.edge(Edge::Edge2)] {
            if !state.resolve(&self.registry, edge) {
                return Err(NoemaError::validation(format!(
                    "relationship {} is not closed: edge {edge:?} does not resolve in ontology {}",
                    relationship.name(),
                    self.name
                )));
            }
        }
        for endpoint in relationship.instance_edges() {
            state.bindings.entry(endpoint).or_default().insert(id);
        }
        debug!(
            "ontology {}: add relationship {} ({id})",
            self.name,
            relationship.name()
        );
        state.relationships.insert(id, relationship);
        Ok(id)
    }

    /// Remove a relationship; its endpoints become unbound if this was
    /// their last binding.
    pub fn remove_relationship(&self, id: RelationshipId) -> Result<Relationship> {
        let mut state = self.state.write();
        let relationship = state.relationships.remove(&id).ok_or_else(|| {
            NoemaError::validation(format!(
                "relationship {id} does not exist in ontology {}",
                self.name
            ))
        })?;
        for endpoint in relationship.instance_edges() {
            state.unbind(endpoint, id);
        }
        Ok(relationship)
    }

    /// Remove every relationship. Concepts are retained and become
    /// unbound.
    pub fn remove_all_relationships(&self) {
        let mut state = self.state.write();
        state.relationships.clear();
        state.bindings.clear();
    }

    /// True if the relationship is part of the ontology.
    pub fn relationship_exists(&self, id: RelationshipId) -> bool {
        self.state.read().relationships.contains_key(&id)
    }

    /// Number of relationships.
    pub fn number_of_relationships(&self) -> usize {
        self.state.read().relationships.len()
    }

    /// A clone of the stored relationship, if present.
    pub fn relationship(&self, id: RelationshipId) -> Option<Relationship> {
        self.state.read().relationships.get(&id).cloned()
    }

    /// Snapshot iteration over all relationships.
    pub fn relationships(&self) -> impl Iterator<Item = Relationship> {
        let snapshot: Vec<Relationship> =
            self.state.read().relationships.values().cloned().collect();
        snapshot.into_iter()
    }

    /// Snapshot iteration over relationships with the given name.
    pub fn relationships_named(&self, name: &str) -> impl Iterator<Item = Relationship> {
        let snapshot: Vec<Relationship> = self
            .state
            .read()
            .relationships
            .values()
            .filter(|r| r.name() == name)
            .cloned()
            .collect();
        snapshot.into_iter()
    }

    /// Snapshot iteration over relationships whose class conforms to
    /// `class`.
    pub fn relationships_of_class(&self, class: &ClassTag) -> impl Iterator<Item = Relationship> {
        let snapshot: Vec<Relationship> = self
            .state
            .read()
            .relationships
            .values()
            .filter(|r| self.registry.conforms(r.class(), class))
            .cloned()
            .collect();
        snapshot.into_iter()
    }

    // -----------------------------------------------------------------------
    // Bound / unbound concepts
    // -----------------------------------------------------------------------

    /// True if at least one relationship in the ontology references the
    /// concept.
    pub fn concept_is_bound(&self, id: ConceptId) -> bool {
        self.state.read().bindings.contains_key(&id)
    }

    /// Number of bound concepts.
    pub fn number_of_bound_concepts(&self) -> usize {
        self.state.read().bindings.len()
    }

    /// Number of unbound concepts.
    pub fn number_of_unbound_concepts(&self) -> usize {
        let state = self.state.read();
        state.concepts.len() - state.bindings.len()
    }

    /// Snapshot iteration over bound concepts.
    pub fn bound_concepts(&self) -> impl Iterator<Item = Concept> {
        let state = self.state.read();
        let snapshot: Vec<Concept> = state
            .concepts
            .values()
            .filter(|c| state.bindings.contains_key(&c.id()))
            .cloned()
            .collect();
        snapshot.into_iter()
    }

    /// Snapshot iteration over unbound concepts.
    pub fn unbound_concepts(&self) -> impl Iterator<Item = Concept> {
        let state = self.state.read();
        let snapshot: Vec<Concept> = state
            .concepts
            .values()
            .filter(|c| !state.bindings.contains_key(&c.id()))
            .cloned()
            .collect();
        snapshot.into_iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

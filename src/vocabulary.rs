//! The built-in vocabulary: a catalog of inherent concept, property,
//! and relationship classes.
//!
//! Pure taxonomy data: each entry is a class name, the base
//! abstraction it specializes, an optional parent class, and a semantic
//! description. Alias classes (PartOf for ComponentOf, Action for
//! Event, ...) are modeled as children of their canonical class so that
//! conformance checks treat them interchangeably. The core performs no
//! validation of the semantics beyond this shape.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::concepts::{BaseAbstraction, ClassRegistry, ClassTag};
use crate::errors::Result;

use BaseAbstraction::{Concept, Property, Relationship};

/// One vocabulary entry: name, base abstraction, optional parent,
/// description.
pub type VocabularyEntry = (&'static str, BaseAbstraction, Option<&'static str>, &'static str);

/// The inherent-concept catalog. Parents precede children.
pub const VOCABULARY: &[VocabularyEntry] = &[
    // Meta-organizational
    ("Model", Concept, None, "Collection of knowledge capturing past or current state"),
    ("Theory", Concept, None, "Collection of knowledge capturing potential or future state"),
    ("Society", Concept, None, "Collection of collaborating agents"),
    ("Layer", Concept, None, "Collection of societies at one level of abstraction"),
    ("Subsystem", Concept, None, "Collection of knowledge, agents, and blackboards"),
    ("System", Concept, None, "Collection of subsystems forming a whole"),
    // Identification
    ("Identity", Property, None, "Internal name for a concept"),
    ("AliasFor", Relationship, None, "Alternate name for a concept"),
    ("IsA", Relationship, None, "Concept is an instance of another concept"),
    // Classification
    ("AKindOf", Relationship, None, "Concept is a subclass of another concept"),
    ("SimilarTo", Relationship, None, "Concept shares characteristics of another concept"),
    ("UnlikeA", Relationship, None, "Concept has characteristics orthogonal to another concept"),
    // Role
    ("Event", Concept, None, "Instance in time and space, typically demarking a state change"),
    ("Action", Concept, Some("Event"), "Alias for Event"),
    ("Occurrence", Concept, Some("Event"), "Alias for Event"),
    ("State", Concept, None, "Instance or region in a landscape of potentials"),
    ("Condition", Concept, Some("State"), "Alias for State"),
    ("Operator", Concept, None, "Instigator of activity"),
    ("Operand", Concept, None, "Target of activity"),
    ("Instrument", Concept, None, "Mechanism contributing to activity"),
    ("Resource", Concept, None, "Finite or infinite material used by activity"),
    ("Input", Concept, None, "Signal entering a system boundary"),
    ("Sensor", Concept, Some("Input"), "Alias for Input"),
    ("Output", Concept, None, "Signal leaving a system boundary"),
    ("Actuator", Concept, Some("Output"), "Alias for Output"),
    ("InputOutput", Concept, None, "Signal entering and leaving a system boundary"),
    ("SensorActuator", Concept, Some("InputOutput"), "Alias for InputOutput"),
    // Compositional
    ("ComponentOf", Relationship, None, "Concept is a structural part of another concept"),
    ("PartOf", Relationship, Some("ComponentOf"), "Alias for ComponentOf"),
    ("ChildOf", Relationship, None, "Concept is a product of another concept"),
    ("ElementOf", Relationship, None, "Concept is a functional part of another concept"),
    ("MaterialOf", Relationship, None, "Concept is an elemental part of another concept"),
    ("MemberOf", Relationship, None, "Concept is a community member of another concept"),
    ("PortionOf", Relationship, None, "Concept is a quantifiable member of another concept"),
    // Spatial
    ("Location", Property, None, "Named place in logical or physical space"),
    ("Position", Property, None, "Instance or region in three-dimensional space"),
    ("Orientation", Property, None, "Absolute or relative direction in three-dimensional space"),
    ("HasContactWith", Relationship, None, "Concept has a direct connection to another concept"),
    ("HasNoContactWith", Relationship, None, "Concept has no direct connection to another concept"),
    ("InteractsWith", Relationship, None, "Concept has a collaborative connection with another concept"),
    ("NoInteractionWith", Relationship, None, "Concept has no collaborative connection with another concept"),
    ("EnclosesA", Relationship, None, "Concept contains another concept"),
    ("IntersectsA", Relationship, None, "Concept intersects another concept"),
    ("PlacementIn", Relationship, None, "Absolute position or orientation within another concept"),
    ("PlacementWith", Relationship, None, "Relative position or orientation to another concept"),
    // Temporal
    ("Date", Property, None, "Absolute or relative date"),
    ("Time", Property, None, "Absolute or relative time"),
    ("DateTime", Property, None, "Date and time"),
    ("Before", Relationship, None, "Concept precedes another concept in time"),
    ("After", Relationship, None, "Concept follows another concept in time"),
    ("CoOccurs", Relationship, None, "Concept is concurrent with another concept in time"),
    // Causal
    ("Goal", Concept, None, "Desired state"),
    ("Aim", Concept, Some("Goal"), "Alias for Goal"),
    ("Purpose", Concept, Some("Goal"), "Alias for Goal"),
    ("Reason", Concept, Some("Goal"), "Alias for Goal"),
    ("Cause", Concept, None, "Precipitating concept"),
    ("Stimulus", Concept, Some("Cause"), "Alias for Cause"),
    ("Factor", Concept, Some("Cause"), "Alias for Cause"),
    ("Consequence", Concept, None, "Outcome of a causal chain"),
    ("Result", Concept, Some("Consequence"), "Alias for Consequence"),
    ("Response", Concept, Some("Consequence"), "Alias for Consequence"),
    ("Effect", Concept, Some("Consequence"), "Alias for Consequence"),
    ("PreconditionOf", Relationship, None, "Concept depends on another concept in a causal chain"),
    ("ConstraintOn", Relationship, None, "Concept opposes another concept in a causal chain"),
    // Relational
    ("Weight", Property, None, "Edge property representing a value-based qualification"),
    ("Directed", Property, None, "Edge property representing directionality"),
    ("Describes", Relationship, None, "Concept describes another concept"),
    ("Represents", Relationship, Some("Describes"), "Alias for Describes"),
    ("Specifies", Relationship, Some("Describes"), "Alias for Describes"),
    ("Realizes", Relationship, None, "Concept makes manifest another concept"),
    ("Satisfies", Relationship, None, "Concept meets the conditions of another concept"),
    ("Delivers", Relationship, None, "Concept makes manifest a concept for another concept"),
    ("Influences", Relationship, None, "Concept encourages or inhibits another concept"),
    ("Encourages", Relationship, None, "Concept promotes the activity of another concept"),
    ("Inhibits", Relationship, None, "Concept discourages the activity of another concept"),
    // Blackboard
    ("Publication", Relationship, None, "Reification of publishing or withdrawing a concept"),
    ("Subscription", Relationship, None, "Reification of subscribing or unsubscribing"),
    // Agent
    ("Source", Concept, None, "Reification of a signal source"),
    ("Message", Concept, None, "Reification of a signal message"),
    ("Parameters", Concept, None, "Reification of agent method parameters"),
    ("Channel", Concept, None, "Reification of a connection path"),
    ("Status", Concept, None, "Reification of agent state"),
];

/// Install the catalog into a registry.
pub fn install(registry: &ClassRegistry) -> Result<()> {
    for (name, base, parent, description) in VOCABULARY {
        let parent = parent.map(ClassTag::new);
        registry.register(*name, *base, parent.as_ref(), *description)?;
    }
    Ok(())
}

/// A shared registry with the catalog pre-installed.
pub fn standard_registry() -> Arc<ClassRegistry> {
    static REGISTRY: Lazy<Arc<ClassRegistry>> = Lazy::new(|| {
        let registry = ClassRegistry::new();
        install(&registry).expect("built-in vocabulary installs cleanly");
        Arc::new(registry)
    });
    Arc::clone(&REGISTRY)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

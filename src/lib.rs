//! # noema
//!
//! A knowledge-representation substrate: typed graphs of named concepts
//! connected by attributed relationships, organized into closed
//! ontologies, and shared between independently scheduled agents
//! through a mediated publish/subscribe blackboard.
//!
//! The three load-bearing pieces:
//!
//! - [`ontology`] keeps every collection closed and complete under
//!   concurrent mutation: a relationship can never dangle.
//! - [`blackboard`] resolves concept and concept-class subscriptions,
//!   promoting class subscribers onto matching instances at publish
//!   time, and fans signals out to agent mailboxes without blocking the
//!   signaler.
//! - [`agent`] defines the actor contract (lifecycle, signals,
//!   channels) with the scheduling substrate kept pluggable;
//!   [`agent::runner`] is the bundled tokio binding.
//!
//! Class semantics are capability tags validated against a
//! [`concepts::ClassRegistry`]; the built-in catalog lives in
//! [`vocabulary`].

pub mod agent;
pub mod blackboard;
pub mod concepts;
pub mod errors;
pub mod logging;
pub mod ontology;
pub mod society;
pub mod vocabulary;

pub use agent::{Activity, Agent, AgentId, AgentStatus, Channel};
pub use blackboard::{Blackboard, Mailbox, Signal, SignalKind, SignalReceiver, SignalSource};
pub use concepts::{
    BaseAbstraction, ClassRegistry, ClassTag, Concept, ConceptId, ConceptRef, Edge, Property,
    Relationship, RelationshipId,
};
pub use errors::{NoemaError, Result};
pub use ontology::Ontology;
pub use society::Society;
pub use vocabulary::standard_registry;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

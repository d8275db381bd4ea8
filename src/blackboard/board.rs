//! The blackboard — a mediated publish/subscribe registry over concepts
//! and concept classes.
//!
//! All bookkeeping (published concepts, publications, direct and class
//! subscriptions) lives behind one lock, so each operation is
//! linearizable and the closure invariant (subscriptions and
//! publications only ever refer to currently published concepts) holds
//! by construction. Signal fan-out snapshots the relevant recipient set
//! inside the same critical section as the state change, then delivers
//! after the lock is released: one unbounded-mailbox send per recipient,
//! so a slow recipient never delays the others or the caller.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use log::{debug, trace};
use parking_lot::RwLock;
use serde_json::Value;
use uuid::Uuid;

use super::signal::{Mailbox, Signal, SignalKind, SignalSource};
use crate::agent::AgentId;
use crate::concepts::{BaseAbstraction, ClassRegistry, ClassTag, Concept, ConceptId};
use crate::errors::{NoemaError, Result};

#[derive(Debug, Default)]
struct BoardState {
    concepts: HashMap<ConceptId, Arc<Concept>>,
    publications: HashMap<ConceptId, AgentId>,
    concept_subscriptions: HashMap<ConceptId, HashSet<AgentId>>,
    class_subscriptions: HashMap<ClassTag, HashSet<AgentId>>,
}

/// A bounded context for a population of agents collaborating around a
/// shared collection of published concepts.
///
/// Ephemeral: state lives only as long as the blackboard itself.
#[derive(Debug)]
pub struct Blackboard {
    id: ConceptId,
    name: String,
    registry: Arc<ClassRegistry>,
    state: RwLock<BoardState>,
    /// Agent mailboxes, installed by [`Blackboard::register_agent`].
    /// Kept outside the state lock; delivery never holds it.
    endpoints: DashMap<AgentId, Mailbox>,
}

impl Blackboard {
    /// Create an empty blackboard validating against the given registry.
    pub fn new(name: impl Into<String>, registry: Arc<ClassRegistry>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            registry,
            state: RwLock::new(BoardState::default()),
            endpoints: DashMap::new(),
        }
    }

    /// The blackboard's identity.
    pub fn id(&self) -> ConceptId {
        self.id
    }

    /// The blackboard's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The class registry this blackboard validates against.
    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }

    // -----------------------------------------------------------------------
    // Agent endpoints
    // -----------------------------------------------------------------------

    /// Install an agent's mailbox so the blackboard can signal it.
    pub fn register_agent(&self, agent: AgentId, mailbox: Mailbox) {
        self.endpoints.insert(agent, mailbox);
    }

    /// True if the agent has a registered mailbox.
    pub fn agent_is_registered(&self, agent: &AgentId) -> bool {
        self.endpoints.contains_key(agent)
    }

    /// Remove an agent entirely: its mailbox and every subscription it
    /// holds. No signals are sent to the retired agent. This is the
    /// cleanup path a stopping agent takes.
    pub fn retire_agent(&self, agent: &AgentId) {
        self.endpoints.remove(agent);
        let mut state = self.state.write();
        state.concept_subscriptions.retain(|_, subs| {
            subs.remove(agent);
            !subs.is_empty()
        });
        state.class_subscriptions.retain(|_, subs| {
            subs.remove(agent);
            !subs.is_empty()
        });
        debug!("blackboard {}: retired agent {agent}", self.name);
    }

    fn deliver(&self, outbox: Vec<(AgentId, Signal)>) {
        for (agent, signal) in outbox {
            match self.endpoints.get(&agent) {
                Some(mailbox) => {
                    if mailbox.send(signal).is_err() {
                        trace!(
                            "blackboard {}: mailbox of agent {agent} is closed",
                            self.name
                        );
                    }
                }
                None => trace!(
                    "blackboard {}: no endpoint for agent {agent}, signal dropped",
                    self.name
                ),
            }
        }
    }

    fn source(&self) -> SignalSource {
        SignalSource::Blackboard(self.name.clone())
    }

    // -----------------------------------------------------------------------
    // Publication
    // -----------------------------------------------------------------------

    /// Publish a concept on behalf of an agent.
    ///
    /// The agent becomes the sole publisher of record; publishing an
    /// already-published concept reassigns the publisher and is not an
    /// error. Atomically with the publication, every class subscription
    /// whose class the concept conforms to is promoted into a direct
    /// subscription on the concept. Promotion is re-resolved on every
    /// publish; nothing is remembered from a previous publication of the
    /// same concept. The publisher and each newly promoted subscriber
    /// are signaled asynchronously after the state change commits.
    pub fn publish_concept(&self, concept: Concept, publisher: AgentId) -> Result<Arc<Concept>> {
        self.registry
            .expect_base(concept.class(), BaseAbstraction::Concept)?;
        let concept = Arc::new(concept);
        let id = concept.id();
        let mut outbox = Vec::new();
        {
            let mut state = self.state.write();
            state.concepts.insert(id, Arc::clone(&concept));
            state.publications.insert(id, publisher);

            let mut promoted: Vec<(AgentId, ClassTag)> = Vec::new();
            for (class, subs) in &state.class_subscriptions {
                if self.registry.conforms(concept.class(), class) {
                    for agent in subs {
                        promoted.push((*agent, class.clone()));
                    }
                }
            }
            for (agent, class) in promoted {
                if state
                    .concept_subscriptions
                    .entry(id)
                    .or_default()
                    .insert(agent)
                {
                    outbox.push((
                        agent,
                        Signal::new(SignalKind::Subscribed, self.source())
                            .with_concept(Arc::clone(&concept))
                            .with_class(class),
                    ));
                }
            }
            outbox.push((
                publisher,
                Signal::new(SignalKind::Published, self.source())
                    .with_concept(Arc::clone(&concept)),
            ));
        }
        debug!(
            "blackboard {}: published {} by agent {publisher}",
            self.name,
            concept.name()
        );
        self.deliver(outbox);
        Ok(concept)
    }

    /// Unpublish a concept: the concept, its publication record, and its
    /// subscriptions are removed together. Publisher and subscribers are
    /// signaled. A concept that was never published is a silent no-op;
    /// returns whether anything was removed.
    pub fn unpublish_concept(&self, id: ConceptId) -> bool {
        let mut outbox = Vec::new();
        let removed = {
            let mut state = self.state.write();
            let Some(concept) = state.concepts.remove(&id) else {
                return false;
            };
            if let Some(publisher) = state.publications.remove(&id) {
                outbox.push((
                    publisher,
                    Signal::new(SignalKind::Unpublished, self.source())
                        .with_concept(Arc::clone(&concept)),
                ));
            }
            if let Some(subs) = state.concept_subscriptions.remove(&id) {
                for agent in subs {
                    outbox.push((
                        agent,
                        Signal::new(SignalKind::Unsubscribed, self.source())
                            .with_concept(Arc::clone(&concept)),
                    ));
                }
            }
            true
        };
        self.deliver(outbox);
        removed
    }

    /// The agent that published the concept.
    pub fn publisher(&self, id: ConceptId) -> Result<AgentId> {
        let state = self.state.read();
        state
            .publications
            .get(&id)
            .copied()
            .ok_or_else(|| self.unpublished(&state, id))
    }

    /// Signal the publisher of the concept with a notification payload.
    pub fn signal_publisher(
        &self,
        id: ConceptId,
        source: SignalSource,
        payload: Option<Value>,
    ) -> Result<()> {
        let outbox = {
            let state = self.state.read();
            let publisher = state
                .publications
                .get(&id)
                .copied()
                .ok_or_else(|| self.unpublished(&state, id))?;
            let concept = state.concepts.get(&id).cloned();
            let mut signal = Signal::new(SignalKind::Notification, source);
            if let Some(concept) = concept {
                signal = signal.with_concept(concept);
            }
            if let Some(payload) = payload {
                signal = signal.with_payload(payload);
            }
            vec![(publisher, signal)]
        };
        self.deliver(outbox);
        Ok(())
    }

    /// Signal the publisher of every currently published concept.
    /// Returns the number of publishers signaled.
    pub fn signal_all_publishers(&self, source: SignalSource, payload: Option<Value>) -> usize {
        let outbox: Vec<(AgentId, Signal)> = {
            let state = self.state.read();
            state
                .publications
                .iter()
                .map(|(id, publisher)| {
                    let mut signal = Signal::new(SignalKind::Notification, source.clone());
                    if let Some(concept) = state.concepts.get(id) {
                        signal = signal.with_concept(Arc::clone(concept));
                    }
                    if let Some(payload) = &payload {
                        signal = signal.with_payload(payload.clone());
                    }
                    (*publisher, signal)
                })
                .collect()
        };
        let n = outbox.len();
        self.deliver(outbox);
        n
    }

    // -----------------------------------------------------------------------
    // Concept subscriptions
    // -----------------------------------------------------------------------

    /// Subscribe an agent to a published concept.
    ///
    /// Fails if the concept is not currently published (closure
    /// invariant) or if the agent is already subscribed. The subscriber
    /// is signaled that the subscription was made manifest.
    pub fn subscribe_to_concept(&self, id: ConceptId, agent: AgentId) -> Result<()> {
        let outbox = {
            let mut state = self.state.write();
            let concept = state
                .concepts
                .get(&id)
                .cloned()
                .ok_or(NoemaError::NotPublished {
                    concept: id.to_string(),
                })?;
            if !state
                .concept_subscriptions
                .entry(id)
                .or_default()
                .insert(agent)
            {
                return Err(NoemaError::validation(format!(
                    "agent {agent} is already subscribed to {}",
                    concept.name()
                )));
            }
            vec![(
                agent,
                Signal::new(SignalKind::Subscribed, self.source()).with_concept(concept),
            )]
        };
        self.deliver(outbox);
        Ok(())
    }

    /// Withdraw an agent's subscription to a concept. Fails if the
    /// concept is not published; unsubscribing an agent that was not
    /// subscribed is a no-op. Once this returns, the agent receives no
    /// further signals for the concept.
    pub fn unsubscribe_from_concept(&self, id: ConceptId, agent: AgentId) -> Result<()> {
        let outbox = {
            let mut state = self.state.write();
            let concept = state
                .concepts
                .get(&id)
                .cloned()
                .ok_or(NoemaError::NotPublished {
                    concept: id.to_string(),
                })?;
            let was_subscribed = match state.concept_subscriptions.get_mut(&id) {
                Some(subs) => {
                    let removed = subs.remove(&agent);
                    if subs.is_empty() {
                        state.concept_subscriptions.remove(&id);
                    }
                    removed
                }
                None => false,
            };
            if was_subscribed {
                vec![(
                    agent,
                    Signal::new(SignalKind::Unsubscribed, self.source()).with_concept(concept),
                )]
            } else {
                Vec::new()
            }
        };
        self.deliver(outbox);
        Ok(())
    }

    /// Withdraw every subscription to the concept.
    pub fn unsubscribe_all_from_concept(&self, id: ConceptId) -> Result<()> {
        let outbox = {
            let mut state = self.state.write();
            let concept = state
                .concepts
                .get(&id)
                .cloned()
                .ok_or(NoemaError::NotPublished {
                    concept: id.to_string(),
                })?;
            match state.concept_subscriptions.remove(&id) {
                Some(subs) => subs
                    .into_iter()
                    .map(|agent| {
                        (
                            agent,
                            Signal::new(SignalKind::Unsubscribed, self.source())
                                .with_concept(Arc::clone(&concept)),
                        )
                    })
                    .collect(),
                None => Vec::new(),
            }
        };
        self.deliver(outbox);
        Ok(())
    }

    /// Withdraw every subscription (direct and class) held by the agent,
    /// signaling each withdrawal. Unlike [`Blackboard::retire_agent`]
    /// the agent keeps its mailbox.
    pub fn unsubscribe_agent(&self, agent: AgentId) {
        let outbox = {
            let mut guard = self.state.write();
            let state = &mut *guard;
            let mut outbox = Vec::new();
            let mut emptied = Vec::new();
            for (id, subs) in &mut state.concept_subscriptions {
                if subs.remove(&agent) {
                    let mut signal = Signal::new(SignalKind::Unsubscribed, self.source());
                    if let Some(concept) = state.concepts.get(id) {
                        signal = signal.with_concept(Arc::clone(concept));
                    }
                    outbox.push((agent, signal));
                    if subs.is_empty() {
                        emptied.push(*id);
                    }
                }
            }
            for id in emptied {
                state.concept_subscriptions.remove(&id);
            }
            let mut emptied_classes = Vec::new();
            for (class, subs) in &mut state.class_subscriptions {
                if subs.remove(&agent) {
                    outbox.push((
                        agent,
                        Signal::new(SignalKind::ClassUnsubscribed, self.source())
                            .with_class(class.clone()),
                    ));
                    if subs.is_empty() {
                        emptied_classes.push(class.clone());
                    }
                }
            }
            for class in emptied_classes {
                state.class_subscriptions.remove(&class);
            }
            outbox
        };
        self.deliver(outbox);
    }

    /// The agents subscribed to the concept.
    pub fn subscribers(&self, id: ConceptId) -> Result<Vec<AgentId>> {
        let state = self.state.read();
        if !state.concepts.contains_key(&id) {
            return Err(self.unpublished(&state, id));
        }
        Ok(state
            .concept_subscriptions
            .get(&id)
            .map(|subs| subs.iter().copied().collect())
            .unwrap_or_default())
    }

    /// Every agent holding at least one concept subscription.
    pub fn all_subscribers(&self) -> Vec<AgentId> {
        let state = self.state.read();
        let mut agents: HashSet<AgentId> = HashSet::new();
        for subs in state.concept_subscriptions.values() {
            agents.extend(subs.iter().copied());
        }
        agents.into_iter().collect()
    }

    /// Signal every agent currently subscribed to the concept.
    ///
    /// The recipient set is the snapshot taken atomically at the moment
    /// of the call: an agent whose unsubscribe returned before this call
    /// is not signaled, and each snapshot member receives exactly one
    /// copy. Returns the number of recipients.
    pub fn signal_subscribers(
        &self,
        id: ConceptId,
        source: SignalSource,
        payload: Option<Value>,
    ) -> Result<usize> {
        let outbox: Vec<(AgentId, Signal)> = {
            let state = self.state.read();
            let concept = state
                .concepts
                .get(&id)
                .cloned()
                .ok_or(NoemaError::NotPublished {
                    concept: id.to_string(),
                })?;
            state
                .concept_subscriptions
                .get(&id)
                .map(|subs| {
                    subs.iter()
                        .map(|agent| {
                            let mut signal = Signal::new(SignalKind::Notification, source.clone())
                                .with_concept(Arc::clone(&concept));
                            if let Some(payload) = &payload {
                                signal = signal.with_payload(payload.clone());
                            }
                            (*agent, signal)
                        })
                        .collect()
                })
                .unwrap_or_default()
        };
        let n = outbox.len();
        self.deliver(outbox);
        Ok(n)
    }

    // -----------------------------------------------------------------------
    // Class subscriptions
    // -----------------------------------------------------------------------

    /// Subscribe an agent to a concept class. The subscription is latent
    /// until an instance of the class (or a subclass) is published, at
    /// which point it is promoted into a direct subscription on that
    /// instance. Already-published instances are not matched
    /// retroactively.
    pub fn subscribe_to_concept_class(&self, class: ClassTag, agent: AgentId) -> Result<()> {
        self.registry.expect_base(&class, BaseAbstraction::Concept)?;
        let outbox = {
            let mut state = self.state.write();
            if !state
                .class_subscriptions
                .entry(class.clone())
                .or_default()
                .insert(agent)
            {
                return Err(NoemaError::validation(format!(
                    "agent {agent} is already subscribed to class {class}"
                )));
            }
            vec![(
                agent,
                Signal::new(SignalKind::ClassSubscribed, self.source()).with_class(class.clone()),
            )]
        };
        debug!("blackboard {}: class subscription on {class} by {agent}", self.name);
        self.deliver(outbox);
        Ok(())
    }

    /// Withdraw an agent's class subscription. Subscriptions already
    /// promoted onto published instances are unaffected. Unsubscribing
    /// when not subscribed is a no-op.
    pub fn unsubscribe_from_concept_class(&self, class: &ClassTag, agent: AgentId) -> Result<()> {
        self.registry.expect_base(class, BaseAbstraction::Concept)?;
        let outbox = {
            let mut state = self.state.write();
            let was_subscribed = match state.class_subscriptions.get_mut(class) {
                Some(subs) => {
                    let removed = subs.remove(&agent);
                    if subs.is_empty() {
                        state.class_subscriptions.remove(class);
                    }
                    removed
                }
                None => false,
            };
            if was_subscribed {
                vec![(
                    agent,
                    Signal::new(SignalKind::ClassUnsubscribed, self.source())
                        .with_class(class.clone()),
                )]
            } else {
                Vec::new()
            }
        };
        self.deliver(outbox);
        Ok(())
    }

    /// The agents holding a latent subscription on the class.
    pub fn class_subscribers(&self, class: &ClassTag) -> Vec<AgentId> {
        self.state
            .read()
            .class_subscriptions
            .get(class)
            .map(|subs| subs.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Signal every agent holding a latent subscription on the class.
    /// Returns the number of recipients.
    pub fn signal_class_subscribers(
        &self,
        class: &ClassTag,
        source: SignalSource,
        payload: Option<Value>,
    ) -> Result<usize> {
        self.registry.expect_base(class, BaseAbstraction::Concept)?;
        let outbox: Vec<(AgentId, Signal)> = {
            let state = self.state.read();
            state
                .class_subscriptions
                .get(class)
                .map(|subs| {
                    subs.iter()
                        .map(|agent| {
                            let mut signal = Signal::new(SignalKind::Notification, source.clone())
                                .with_class(class.clone());
                            if let Some(payload) = &payload {
                                signal = signal.with_payload(payload.clone());
                            }
                            (*agent, signal)
                        })
                        .collect()
                })
                .unwrap_or_default()
        };
        let n = outbox.len();
        self.deliver(outbox);
        Ok(n)
    }

    // -----------------------------------------------------------------------
    // Lookup and iteration
    // -----------------------------------------------------------------------

    /// True if the concept is currently published.
    pub fn concept_exists(&self, id: ConceptId) -> bool {
        self.state.read().concepts.contains_key(&id)
    }

    /// Number of published concepts.
    pub fn number_of_concepts(&self) -> usize {
        self.state.read().concepts.len()
    }

    /// The published concept, if present.
    pub fn concept(&self, id: ConceptId) -> Option<Arc<Concept>> {
        self.state.read().concepts.get(&id).cloned()
    }

    /// Snapshot iteration over published concepts.
    pub fn concepts(&self) -> impl Iterator<Item = Arc<Concept>> {
        let snapshot: Vec<Arc<Concept>> = self.state.read().concepts.values().cloned().collect();
        snapshot.into_iter()
    }

    /// Snapshot iteration over published concepts with the given name.
    pub fn concepts_named(&self, name: &str) -> impl Iterator<Item = Arc<Concept>> {
        let snapshot: Vec<Arc<Concept>> = self
            .state
            .read()
            .concepts
            .values()
            .filter(|c| c.name() == name)
            .cloned()
            .collect();
        snapshot.into_iter()
    }

    /// Snapshot iteration over published concepts whose class conforms
    /// to `class`.
    pub fn concepts_of_class(&self, class: &ClassTag) -> impl Iterator<Item = Arc<Concept>> {
        let snapshot: Vec<Arc<Concept>> = self
            .state
            .read()
            .concepts
            .values()
            .filter(|c| self.registry.conforms(c.class(), class))
            .cloned()
            .collect();
        snapshot.into_iter()
    }

    fn unpublished(&self, state: &BoardState, id: ConceptId) -> NoemaError {
        let concept = state
            .concepts
            .get(&id)
            .map(|c| c.name().to_string())
            .unwrap_or_else(|| id.to_string());
        NoemaError::NotPublished { concept }
    }
}

//! Signals — the payload delivered to agent mailboxes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::agent::AgentId;
use crate::concepts::{ClassTag, Concept};

/// What a signal reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// A concept was published (sent to the publisher of record).
    Published,
    /// A concept was unpublished (sent to the publisher of record).
    Unpublished,
    /// A subscription was made manifest (direct or by class promotion).
    Subscribed,
    /// A subscription was withdrawn.
    Unsubscribed,
    /// A class subscription was registered.
    ClassSubscribed,
    /// A class subscription was withdrawn.
    ClassUnsubscribed,
    /// An application-level notification carried on behalf of a caller.
    Notification,
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SignalKind::Published => "published",
            SignalKind::Unpublished => "unpublished",
            SignalKind::Subscribed => "subscribed",
            SignalKind::Unsubscribed => "unsubscribed",
            SignalKind::ClassSubscribed => "class_subscribed",
            SignalKind::ClassUnsubscribed => "class_unsubscribed",
            SignalKind::Notification => "notification",
        };
        f.write_str(name)
    }
}

/// Who emitted a signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalSource {
    /// A blackboard, by name.
    Blackboard(String),
    /// An agent, by identity.
    Agent(AgentId),
}

/// An asynchronous, fire-and-forget message delivered to an agent.
///
/// Signals are in-process values; the optional concept rides along as a
/// shared reference, the optional payload as an untyped value.
#[derive(Debug, Clone)]
pub struct Signal {
    pub kind: SignalKind,
    pub source: SignalSource,
    pub concept: Option<Arc<Concept>>,
    pub class: Option<ClassTag>,
    pub payload: Option<Value>,
    pub at: DateTime<Utc>,
}

impl Signal {
    /// Create a signal with no concept, class, or payload attached.
    pub fn new(kind: SignalKind, source: SignalSource) -> Self {
        Self {
            kind,
            source,
            concept: None,
            class: None,
            payload: None,
            at: Utc::now(),
        }
    }

    /// Attach the concept the signal concerns.
    pub fn with_concept(mut self, concept: Arc<Concept>) -> Self {
        self.concept = Some(concept);
        self
    }

    /// Attach the concept class the signal concerns.
    pub fn with_class(mut self, class: ClassTag) -> Self {
        self.class = Some(class);
        self
    }

    /// Attach an application payload.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Sending half of an agent's mailbox. Sends never block; a slow
/// recipient cannot delay delivery to others.
pub type Mailbox = mpsc::UnboundedSender<Signal>;

/// Receiving half of an agent's mailbox.
pub type SignalReceiver = mpsc::UnboundedReceiver<Signal>;

/// Create a fresh mailbox pair.
pub fn mailbox() -> (Mailbox, SignalReceiver) {
    mpsc::unbounded_channel()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
